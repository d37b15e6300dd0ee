//! Port traits: the boundary between LED logic and the outside world.
//!
//! ```text
//!   LedManagerService ──▶ LedPort ──▶ OEM light device
//!   LightsModule      ──▶ BrightnessPort ──▶ sysfs
//! ```
//!
//! Both write-side ports take `&self`: they are called from behind the HAL
//! mutex and from the one-shot playback thread, so implementations carry
//! their own interior state.

use std::path::Path;
use std::sync::Arc;

use crate::drivers::light_state::OemLightState;
use crate::error::Result;

use super::events::ServiceEvent;

// ───────────────────────────────────────────────────────────────
// Brightness port (HAL → kernel)
// ───────────────────────────────────────────────────────────────

/// Writes a decimal value into a brightness-style file.
pub trait BrightnessPort: Send + Sync {
    /// Write `value` followed by a newline to `path`.
    fn write_int(&self, path: &Path, value: u32) -> Result<()>;
}

/// Lets a caller keep a handle on the writer it gave to a lights module.
impl<T: BrightnessPort + ?Sized> BrightnessPort for Arc<T> {
    fn write_int(&self, path: &Path, value: u32) -> Result<()> {
        (**self).write_int(path, value)
    }
}

// ───────────────────────────────────────────────────────────────
// LED port (service → HAL)
// ───────────────────────────────────────────────────────────────

/// The service drives the LED bar exclusively through this port.
pub trait LedPort: Send + Sync {
    fn set_led(&self, state: &OemLightState);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (service → logging)
// ───────────────────────────────────────────────────────────────

/// The service reports scheduling decisions through this port.
pub trait EventSink: Send {
    fn emit(&mut self, event: &ServiceEvent);
}
