//! Lights HAL configuration
//!
//! Sysfs paths and the HAL flavour. Defaults match the device's kernel
//! LED class layout; a JSON file can override any field.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Which set of logical lights the module exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HalFlavour {
    /// Backlight plus the OEM multi-LED device.
    Oem,
    /// Backlight plus the battery / notifications / attention speaker light.
    Speaker,
}

/// Core lights configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LightsConfig {
    pub flavour: HalFlavour,

    // --- sysfs brightness files ---
    pub red_led: PathBuf,
    pub green_led: PathBuf,
    pub blue_led: PathBuf,
    pub lcd_backlight: PathBuf,
    /// Receives the blink frequency of a timed speaker light.
    pub blink: PathBuf,

    /// Log every non-backlight write (noisy).
    pub trace_writes: bool,
}

impl Default for LightsConfig {
    fn default() -> Self {
        Self {
            flavour: HalFlavour::Oem,
            red_led: PathBuf::from("/sys/class/leds/red/brightness"),
            green_led: PathBuf::from("/sys/class/leds/green/brightness"),
            blue_led: PathBuf::from("/sys/class/leds/blue/brightness"),
            lcd_backlight: PathBuf::from("/sys/class/leds/lcd-backlight/brightness"),
            // The red channel doubles as the blink control on this board.
            blink: PathBuf::from("/sys/class/leds/red/brightness"),
            trace_writes: false,
        }
    }
}

impl LightsConfig {
    /// Configuration rooted at `dir`, one `<name>/brightness` file per LED.
    /// Used for simulated sysfs trees.
    pub fn rooted_at(dir: &Path, flavour: HalFlavour) -> Self {
        Self {
            flavour,
            red_led: dir.join("red/brightness"),
            green_led: dir.join("green/brightness"),
            blue_led: dir.join("blue/brightness"),
            lcd_backlight: dir.join("lcd-backlight/brightness"),
            blink: dir.join("red/brightness"),
            trace_writes: false,
        }
    }

    /// Parse and validate a JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|_| Error::Config("malformed JSON"))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let paths = [
            &self.red_led,
            &self.green_led,
            &self.blue_led,
            &self.lcd_backlight,
            &self.blink,
        ];
        if paths.iter().any(|p| p.as_os_str().is_empty()) {
            return Err(Error::Config("sysfs paths must not be empty"));
        }
        Ok(())
    }
}
