//! Lights module, light-state arithmetic and the sysfs writer.

pub mod light_state;
pub mod lights;
pub mod sysfs;
