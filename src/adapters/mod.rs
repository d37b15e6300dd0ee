//! Adapters: concrete implementations of the port traits.
//!
//! | Adapter      | Implements | Connects to                 |
//! |--------------|------------|-----------------------------|
//! | `oem_bridge` | LedPort    | OEM light device (HAL)      |
//! | `log_sink`   | EventSink  | `log` facade                |
//!
//! The sysfs [`BrightnessPort`](crate::app::ports::BrightnessPort) lives with
//! the lights module in [`drivers::sysfs`](crate::drivers::sysfs).

pub mod log_sink;
pub mod oem_bridge;
