//! Unified error types for the lights HAL and LED manager.
//!
//! A single `Error` enum that every subsystem converts into. All variants are
//! `Copy` so they pass through the HAL mutex and the service lock without
//! allocation. [`Error::errno`] recovers the negated errno the HAL ABI hands
//! back to its callers.

use core::fmt;

/// `EINVAL` on Linux/Android.
pub const EINVAL: i32 = 22;
/// `EIO` on Linux/Android; used when an I/O error carries no OS code.
pub const EIO: i32 = 5;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Unknown light id, disabled light, or an out-of-range event argument.
    InvalidArgument(&'static str),
    /// A sysfs file could not be opened or written.
    Io(i32),
    /// Configuration is invalid or could not be loaded.
    Config(&'static str),
}

impl Error {
    /// Negated errno as returned through the HAL interface (`-EINVAL`, ...).
    pub const fn errno(self) -> i32 {
        match self {
            Self::InvalidArgument(_) | Self::Config(_) => -EINVAL,
            Self::Io(code) => -code,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            Self::Io(code) => write!(f, "I/O error (errno {code})"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.raw_os_error().unwrap_or(EIO))
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
