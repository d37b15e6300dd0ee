//! LED event descriptions posted by clients.
//!
//! A [`LedInfo`] is either **periodic** (seven colours held with a hardware
//! on/off cadence until removed) or **one-shot** (a list of timed steps
//! played `repeat` times, then done). The `app_id` doubles as the priority:
//! a higher id pre-empts a lower one.
//!
//! ```text
//!   periodic:  [c1 .. c7] on_ms / off_ms
//!   one-shot:  [dur, c1 .. c7] × N  ──▶ repeat
//! ```

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::drivers::light_state::{OEM_LED_COUNT, OemLightState};
use crate::error::{Error, Result};

/// Exclusive lower bound of valid app ids.
pub const APPID_MIN: u8 = 0;
pub const APPID_BATTERY: u8 = 5;
pub const APPID_CALL: u8 = 20;
/// Exclusive upper bound of valid app ids.
pub const APPID_TOP: u8 = APPID_CALL + 1;

/// Number of distinct valid app ids; bounds the queue and handler lists.
pub const MAX_APPS: usize = (APPID_TOP - APPID_MIN - 1) as usize;

/// Packed `0x00RRGGBB` colours understood by the LED bar.
pub mod colour {
    pub const BLACK: u32 = 0x0000_0000;
    pub const WHITE: u32 = 0x00FF_FFFF;
    pub const RED: u32 = 0x00FF_0000;
    pub const YELLOW: u32 = 0x00FF_FF00;
    pub const GREEN: u32 = 0x0000_FF00;
    pub const CYAN: u32 = 0x0000_FFFF;
    pub const BLUE: u32 = 0x0000_00FF;
    pub const MAGENTA: u32 = 0x00FF_00FF;
}

/// One step of a one-shot pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternStep {
    pub duration_ms: u32,
    pub colours: [u32; OEM_LED_COUNT],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedEvent {
    Periodic {
        colours: [u32; OEM_LED_COUNT],
        on_ms: u32,
        off_ms: u32,
    },
    OneShot {
        steps: Vec<PatternStep>,
        repeat: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedInfo {
    app_id: u8,
    #[serde(default)]
    pub option: i32,
    event: LedEvent,
}

impl LedInfo {
    pub fn periodic(
        app_id: u8,
        colours: [u32; OEM_LED_COUNT],
        on_ms: u32,
        off_ms: u32,
    ) -> Result<Self> {
        let info = Self {
            app_id,
            option: 0,
            event: LedEvent::Periodic {
                colours,
                on_ms,
                off_ms,
            },
        };
        info.validate()?;
        Ok(info)
    }

    pub fn one_shot(app_id: u8, steps: Vec<PatternStep>, repeat: u32) -> Result<Self> {
        let info = Self {
            app_id,
            option: 0,
            event: LedEvent::OneShot { steps, repeat },
        };
        info.validate()?;
        Ok(info)
    }

    #[must_use]
    pub fn with_option(mut self, option: i32) -> Self {
        self.option = option;
        self
    }

    /// Checks the invariants the constructors enforce; deserialised values
    /// go through here too.
    pub fn validate(&self) -> Result<()> {
        if !(APPID_MIN + 1..APPID_TOP).contains(&self.app_id) {
            return Err(Error::InvalidArgument("app id out of range"));
        }
        if let LedEvent::OneShot { steps, repeat } = &self.event {
            if steps.is_empty() {
                return Err(Error::InvalidArgument("one-shot pattern is empty"));
            }
            if *repeat == 0 {
                return Err(Error::InvalidArgument("one-shot repeat must be positive"));
            }
        }
        Ok(())
    }

    pub fn app_id(&self) -> u8 {
        self.app_id
    }

    pub fn event(&self) -> &LedEvent {
        &self.event
    }

    pub fn is_periodic(&self) -> bool {
        matches!(self.event, LedEvent::Periodic { .. })
    }

    /// Zero for periodic events.
    pub fn repeat_count(&self) -> u32 {
        match &self.event {
            LedEvent::OneShot { repeat, .. } => *repeat,
            LedEvent::Periodic { .. } => 0,
        }
    }

    /// `None` for periodic events.
    pub fn steps(&self) -> Option<&[PatternStep]> {
        match &self.event {
            LedEvent::OneShot { steps, .. } => Some(steps),
            LedEvent::Periodic { .. } => None,
        }
    }

    /// The steady state a periodic event asks the LED bar to hold.
    pub fn periodic_state(&self) -> Option<OemLightState> {
        match self.event {
            LedEvent::Periodic {
                colours,
                on_ms,
                off_ms,
            } => Some(OemLightState {
                leds: colours,
                flash_on_ms: on_ms,
                flash_off_ms: off_ms,
                option: self.option,
            }),
            LedEvent::OneShot { .. } => None,
        }
    }

    /// The LED bar state for one step of a one-shot pattern.
    pub fn step_state(&self, step: &PatternStep) -> OemLightState {
        OemLightState {
            leds: step.colours,
            flash_on_ms: 0,
            flash_off_ms: 0,
            option: self.option,
        }
    }

    // ── Wire format ───────────────────────────────────────────

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        postcard::to_allocvec(self).map_err(|_| Error::InvalidArgument("unencodable LedInfo"))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let info: Self =
            postcard::from_bytes(bytes).map_err(|_| Error::InvalidArgument("malformed LedInfo"))?;
        info.validate()?;
        Ok(info)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let info: Self =
            serde_json::from_str(json).map_err(|_| Error::InvalidArgument("malformed LedInfo"))?;
        info.validate()?;
        Ok(info)
    }
}

impl fmt::Display for LedInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AppId: {}, Periodicity: {}", self.app_id, self.is_periodic())?;
        match &self.event {
            LedEvent::Periodic {
                colours,
                on_ms,
                off_ms,
            } => {
                for (i, c) in colours.iter().enumerate() {
                    write!(f, "\n#{i}] color: 0x{c:x}")?;
                }
                write!(f, ", OnMs: {on_ms}, OffMs: {off_ms}")
            }
            LedEvent::OneShot { steps, repeat } => {
                write!(f, ", Repeat: {repeat}")?;
                for (i, step) in steps.iter().enumerate() {
                    write!(f, "\n#{i}] duration: {}", step.duration_ms)?;
                    for c in &step.colours {
                        write!(f, " color: 0x{c:x}")?;
                    }
                }
                Ok(())
            }
        }
    }
}
