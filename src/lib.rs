//! OEM LED library.
//!
//! Two layers:
//! - [`drivers`]: the lights module. Opens a light by id and writes
//!   brightness values into sysfs under one module-wide mutex.
//! - [`app`]: the LED manager service. Arbitrates the OEM LED bar between
//!   clients by priority, playing periodic and one-shot events.
//!
//! [`adapters`] join the two: the OEM bridge feeds the service's LED port
//! into the lights module.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod drivers;
pub mod error;

pub use error::{Error, Result};
