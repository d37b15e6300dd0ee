//! Outbound service events.
//!
//! The [`LedManagerService`](super::service::LedManagerService) emits these
//! through the [`EventSink`](super::ports::EventSink) port whenever its
//! scheduling decision changes what the LED bar shows.

use core::fmt;

/// Identity of a connected client; death handlers are keyed on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId(pub u64);

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "client#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceEvent {
    /// A periodic event took over the LED bar.
    PeriodicStarted { app_id: u8 },
    /// A one-shot pattern began playing.
    OneShotStarted { app_id: u8, repeat: u32 },
    /// The LED bar was switched off; carries the event that was showing.
    Finished { app_id: Option<u8> },
    /// A one-shot event ranked below the queue head and was dropped.
    Rejected { app_id: u8 },
    /// A client went away; its events were withdrawn.
    ClientDied { client: ClientId, app_id: u8 },
}
