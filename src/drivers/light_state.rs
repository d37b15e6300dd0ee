//! Light-state snapshots and the colour arithmetic applied to them.
//!
//! A [`LightState`] is what the framework asks a single light to show; an
//! [`OemLightState`] carries the seven independent channels of the OEM LED
//! bar. Both are immutable per call.

use serde::{Deserialize, Serialize};

/// Number of independent channels on the OEM LED bar.
pub const OEM_LED_COUNT: usize = 7;

/// How a light should flash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlashMode {
    #[default]
    None,
    /// Software timed on/off.
    Timed,
    /// Flash handled by the LED controller.
    Hardware,
}

/// Request for a single-channel light.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LightState {
    /// Packed `0xAARRGGBB`; the alpha byte is ignored.
    pub color: u32,
    pub flash_mode: FlashMode,
    pub flash_on_ms: u32,
    pub flash_off_ms: u32,
}

impl LightState {
    pub const fn solid(color: u32) -> Self {
        Self {
            color,
            flash_mode: FlashMode::None,
            flash_on_ms: 0,
            flash_off_ms: 0,
        }
    }

    pub const fn timed(color: u32, on_ms: u32, off_ms: u32) -> Self {
        Self {
            color,
            flash_mode: FlashMode::Timed,
            flash_on_ms: on_ms,
            flash_off_ms: off_ms,
        }
    }

    /// `(red, green, blue)` bytes of the colour.
    pub const fn rgb(&self) -> (u8, u8, u8) {
        (
            (self.color >> 16) as u8,
            (self.color >> 8) as u8,
            self.color as u8,
        )
    }

    /// True when any colour channel is non-zero.
    pub const fn is_lit(&self) -> bool {
        self.color & 0x00ff_ffff != 0
    }

    /// Luma-weighted brightness, `(77R + 150G + 29B) >> 8`, in `0..=255`.
    pub const fn brightness(&self) -> u8 {
        let (r, g, b) = self.rgb();
        ((77 * r as u32 + 150 * g as u32 + 29 * b as u32) >> 8) as u8
    }

    /// On/off times that actually apply: only `Timed` flashes blink.
    pub const fn effective_flash(&self) -> (u32, u32) {
        match self.flash_mode {
            FlashMode::Timed => (self.flash_on_ms, self.flash_off_ms),
            FlashMode::None | FlashMode::Hardware => (0, 0),
        }
    }
}

/// Request for the OEM LED bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OemLightState {
    /// `led1..led7`; values are interpreted by the LED controller.
    pub leds: [u32; OEM_LED_COUNT],
    pub flash_on_ms: u32,
    pub flash_off_ms: u32,
    pub option: i32,
}

impl OemLightState {
    /// All channels dark.
    pub const OFF: Self = Self {
        leds: [0; OEM_LED_COUNT],
        flash_on_ms: 0,
        flash_off_ms: 0,
        option: 0,
    };

    pub fn is_off(&self) -> bool {
        *self == Self::OFF
    }
}

/// Three-step level written to a speaker-light channel: 0 off, 1 dim, 2 bright.
pub const fn channel_level(value: u8) -> u8 {
    match value {
        0 => 0,
        1..=128 => 1,
        _ => 2,
    }
}

/// Blink parameters derived from on/off times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Blink {
    /// Controller rate; about one blink per second at 20.
    pub freq: u32,
    /// ON share of the period, 0 (always off) to 255 (always on).
    pub pwm: u32,
}

impl Blink {
    /// `None` unless both times are positive.
    pub fn from_times(on_ms: u32, off_ms: u32) -> Option<Self> {
        if on_ms == 0 || off_ms == 0 {
            return None;
        }
        let total = u64::from(on_ms) + u64::from(off_ms);
        let freq = (total / 50) as u32;
        let mut pwm = (u64::from(on_ms) * 255 / total) as u32;
        // the controller ignores the low 4 bits
        if (1..16).contains(&pwm) {
            pwm = 16;
        }
        Some(Self { freq, pwm })
    }
}
