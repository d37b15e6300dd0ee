//! LED manager core: event model, queue and scheduling.
//!
//! Everything here talks to hardware only through the **port traits** in
//! [`ports`], so the service runs against mock adapters in tests.

pub mod events;
pub mod led_info;
pub mod playback;
pub mod ports;
pub mod queue;
pub mod service;
