//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing service events to the `log` facade.

use log::info;

use crate::app::events::ServiceEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`ServiceEvent`].
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &ServiceEvent) {
        match event {
            ServiceEvent::PeriodicStarted { app_id } => {
                info!("LED | periodic appId={}", app_id);
            }
            ServiceEvent::OneShotStarted { app_id, repeat } => {
                info!("LED | one-shot appId={} repeat={}", app_id, repeat);
            }
            ServiceEvent::Finished { app_id: Some(id) } => {
                info!("LED | off (was appId={})", id);
            }
            ServiceEvent::Finished { app_id: None } => {
                info!("LED | off");
            }
            ServiceEvent::Rejected { app_id } => {
                info!("LED | rejected one-shot appId={}", app_id);
            }
            ServiceEvent::ClientDied { client, app_id } => {
                info!("LED | {} died, withdrew appId={}", client, app_id);
            }
        }
    }
}
