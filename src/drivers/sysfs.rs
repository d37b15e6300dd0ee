//! Sysfs brightness writer.
//!
//! Each write opens the file, writes `"{value}\n"` and closes it again, the
//! way the kernel LED class expects. A missing file is reported once per
//! writer and then only returned as an errno.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{error, info};

use crate::app::ports::BrightnessPort;
use crate::error::Result;

pub struct SysfsWriter {
    already_warned: AtomicBool,
    trace: bool,
}

impl SysfsWriter {
    pub fn new(trace: bool) -> Self {
        Self {
            already_warned: AtomicBool::new(false),
            trace,
        }
    }
}

impl Default for SysfsWriter {
    fn default() -> Self {
        Self::new(false)
    }
}

impl BrightnessPort for SysfsWriter {
    fn write_int(&self, path: &Path, value: u32) -> Result<()> {
        let opened = OpenOptions::new()
            .read(true)
            .write(true)
            .truncate(true)
            .open(path);

        let is_backlight = path.to_string_lossy().contains("backlight");
        if self.trace && !is_backlight {
            info!(
                "write_int() path:{}, value:0x{:02x}, ok:{}",
                path.display(),
                value,
                opened.is_ok()
            );
        }

        match opened {
            Ok(mut file) => {
                file.write_all(format!("{value}\n").as_bytes())?;
                Ok(())
            }
            Err(e) => {
                if !self.already_warned.swap(true, Ordering::Relaxed) {
                    error!("write_int failed to open {}", path.display());
                }
                Err(e.into())
            }
        }
    }
}
