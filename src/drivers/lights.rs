//! Lights module: open/dispatch and the per-light setters.
//!
//! [`LightsModule::open`] maps a logical light id to a device record that
//! carries the setter for that light as a plain function pointer. Every
//! setter runs under the one module-wide mutex, which also guards the
//! speaker-light state (last battery and notification requests, attention).
//!
//! | Light id        | Flavour  | Effect                                   |
//! |-----------------|----------|------------------------------------------|
//! | `backlight`     | both     | luma brightness → LCD backlight file     |
//! | `battery`       | speaker  | stored, then speaker light re-evaluated  |
//! | `notifications` | speaker  | stored, then speaker light re-evaluated  |
//! | `attention`     | speaker  | flash value stored, re-evaluated         |
//! | `oem_led`       | oem      | 7-channel descriptor logged              |

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use log::{debug, info};

use crate::app::ports::BrightnessPort;
use crate::config::{HalFlavour, LightsConfig};
use crate::error::{Error, Result};

use super::light_state::{Blink, FlashMode, LightState, OemLightState, channel_level};

pub const LIGHT_ID_BACKLIGHT: &str = "backlight";
pub const LIGHT_ID_BATTERY: &str = "battery";
pub const LIGHT_ID_NOTIFICATIONS: &str = "notifications";
pub const LIGHT_ID_ATTENTION: &str = "attention";
pub const LIGHT_ID_OEM_LED: &str = "oem_led";

/// Static description of the module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub author: &'static str,
    pub version_major: u16,
    pub version_minor: u16,
}

pub const MODULE_INFO: ModuleInfo = ModuleInfo {
    id: "lights",
    name: "lights Module",
    author: "OEM LED Engineering",
    version_major: 1,
    version_minor: 0,
};

/// Speaker-light state shared by every device of a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HalState {
    pub notification: LightState,
    pub battery: LightState,
    /// Hardware flash on-time requested by the attention light, 0 when off.
    pub attention_ms: u32,
}

struct Shared<W> {
    config: LightsConfig,
    writer: W,
    state: OnceLock<Mutex<HalState>>,
}

impl<W: BrightnessPort> Shared<W> {
    /// One-time setup of the shared state, run by the first open.
    fn init_globals(&self) -> &Mutex<HalState> {
        self.state.get_or_init(|| Mutex::new(HalState::default()))
    }

    fn lock(&self) -> MutexGuard<'_, HalState> {
        self.init_globals()
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Speaker-light writes are best effort; the writer already reports the
    /// first open failure.
    fn write_quiet(&self, path: &Path, value: u32) {
        if let Err(e) = self.writer.write_int(path, value) {
            debug!("{}: {}", path.display(), e);
        }
    }
}

type SetLightFn<W> = fn(&Shared<W>, &LightState) -> Result<()>;
type SetOemLightFn<W> = fn(&Shared<W>, &OemLightState) -> Result<()>;

// ───────────────────────────────────────────────────────────────
// Module
// ───────────────────────────────────────────────────────────────

/// The lights module. Cheap to clone; clones share the mutex and state.
pub struct LightsModule<W> {
    shared: Arc<Shared<W>>,
}

impl<W> Clone for LightsModule<W> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<W: BrightnessPort> LightsModule<W> {
    pub fn new(config: LightsConfig, writer: W) -> Self {
        Self {
            shared: Arc::new(Shared {
                config,
                writer,
                state: OnceLock::new(),
            }),
        }
    }

    pub fn info(&self) -> ModuleInfo {
        MODULE_INFO
    }

    pub fn config(&self) -> &LightsConfig {
        &self.shared.config
    }

    /// Open the light called `name`.
    ///
    /// Fails with [`Error::InvalidArgument`] (`-EINVAL`) for an unknown id or
    /// one the configured flavour does not expose.
    pub fn open(&self, name: &str) -> Result<Device<W>> {
        let flavour = self.shared.config.flavour;
        let (id, set_light): (&'static str, SetLightFn<W>) = match (name, flavour) {
            (LIGHT_ID_BACKLIGHT, _) => (LIGHT_ID_BACKLIGHT, set_light_backlight),
            (LIGHT_ID_BATTERY, HalFlavour::Speaker) => (LIGHT_ID_BATTERY, set_light_battery),
            (LIGHT_ID_NOTIFICATIONS, HalFlavour::Speaker) => {
                (LIGHT_ID_NOTIFICATIONS, set_light_notifications)
            }
            (LIGHT_ID_ATTENTION, HalFlavour::Speaker) => (LIGHT_ID_ATTENTION, set_light_attention),
            (LIGHT_ID_OEM_LED, HalFlavour::Oem) => {
                debug!("open_lights(). name:{}", name);
                self.shared.init_globals();
                return Ok(Device::Oem(OemLightDevice {
                    module: self.clone(),
                    set_light: set_light_oem_led,
                }));
            }
            _ => return Err(Error::InvalidArgument("unknown light id")),
        };

        self.shared.init_globals();
        Ok(Device::Light(LightDevice {
            id,
            module: self.clone(),
            set_light,
        }))
    }

    /// Copy of the speaker-light state.
    pub fn state(&self) -> HalState {
        *self.shared.lock()
    }
}

// ───────────────────────────────────────────────────────────────
// Devices
// ───────────────────────────────────────────────────────────────

/// What [`LightsModule::open`] hands back.
pub enum Device<W> {
    Light(LightDevice<W>),
    Oem(OemLightDevice<W>),
}

impl<W> Device<W> {
    pub fn into_light(self) -> Result<LightDevice<W>> {
        match self {
            Self::Light(dev) => Ok(dev),
            Self::Oem(_) => Err(Error::InvalidArgument("not a single-channel light")),
        }
    }

    pub fn into_oem(self) -> Result<OemLightDevice<W>> {
        match self {
            Self::Oem(dev) => Ok(dev),
            Self::Light(_) => Err(Error::InvalidArgument("not the OEM LED")),
        }
    }
}

/// A single-channel light.
pub struct LightDevice<W> {
    id: &'static str,
    module: LightsModule<W>,
    set_light: SetLightFn<W>,
}

impl<W: BrightnessPort> LightDevice<W> {
    pub fn id(&self) -> &'static str {
        self.id
    }

    pub fn module(&self) -> &LightsModule<W> {
        &self.module
    }

    pub fn set_light(&self, state: &LightState) -> Result<()> {
        (self.set_light)(&self.module.shared, state)
    }

    pub fn close(self) -> Result<()> {
        Ok(())
    }
}

/// The OEM multi-LED bar.
pub struct OemLightDevice<W> {
    module: LightsModule<W>,
    set_light: SetOemLightFn<W>,
}

impl<W: BrightnessPort> OemLightDevice<W> {
    pub fn module(&self) -> &LightsModule<W> {
        &self.module
    }

    pub fn set_light(&self, state: &OemLightState) -> Result<()> {
        (self.set_light)(&self.module.shared, state)
    }

    pub fn close(self) -> Result<()> {
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// Setters
// ───────────────────────────────────────────────────────────────

fn set_light_backlight<W: BrightnessPort>(shared: &Shared<W>, state: &LightState) -> Result<()> {
    let brightness = state.brightness();
    let _guard = shared.lock();
    shared
        .writer
        .write_int(&shared.config.lcd_backlight, u32::from(brightness))
}

fn set_light_battery<W: BrightnessPort>(shared: &Shared<W>, state: &LightState) -> Result<()> {
    let mut st = shared.lock();
    st.battery = *state;
    handle_speaker_battery_locked(shared, &st);
    Ok(())
}

fn set_light_notifications<W: BrightnessPort>(
    shared: &Shared<W>,
    state: &LightState,
) -> Result<()> {
    let mut st = shared.lock();
    st.notification = *state;
    handle_speaker_battery_locked(shared, &st);
    Ok(())
}

fn set_light_attention<W: BrightnessPort>(shared: &Shared<W>, state: &LightState) -> Result<()> {
    let mut st = shared.lock();
    match state.flash_mode {
        FlashMode::Hardware => st.attention_ms = state.flash_on_ms,
        FlashMode::None => st.attention_ms = 0,
        FlashMode::Timed => {}
    }
    handle_speaker_battery_locked(shared, &st);
    Ok(())
}

fn set_light_oem_led<W: BrightnessPort>(shared: &Shared<W>, state: &OemLightState) -> Result<()> {
    let _guard = shared.lock();
    let [l1, l2, l3, l4, l5, l6, l7] = state.leds;
    info!(
        "set_light_oem_led: led1 : 0x{:08x}, led2 : 0x{:08x}, led3 : 0x{:08x}, \
         led4 : 0x{:08x}, led5 : 0x{:08x}, led6 : 0x{:08x}, led7 : 0x{:08x}, \
         onMs: {}, offMs: {}, option: {}",
        l1, l2, l3, l4, l5, l6, l7, state.flash_on_ms, state.flash_off_ms, state.option
    );
    // TODO: drive the LED bar once its sysfs nodes are exposed by the kernel driver.
    Ok(())
}

/// Battery wins while lit; otherwise the notification shows.
fn handle_speaker_battery_locked<W: BrightnessPort>(shared: &Shared<W>, st: &HalState) {
    if st.battery.is_lit() {
        set_speaker_light_locked(shared, &st.battery);
    } else {
        set_speaker_light_locked(shared, &st.notification);
    }
}

fn set_speaker_light_locked<W: BrightnessPort>(shared: &Shared<W>, state: &LightState) {
    let (on_ms, off_ms) = state.effective_flash();
    let (r, g, b) = state.rgb();
    let config = &shared.config;

    shared.write_quiet(&config.red_led, u32::from(channel_level(r)));
    shared.write_quiet(&config.green_led, u32::from(channel_level(g)));
    shared.write_quiet(&config.blue_led, u32::from(channel_level(b)));

    if let Some(blink) = Blink::from_times(on_ms, off_ms) {
        debug!("speaker blink freq={} pwm={}", blink.freq, blink.pwm);
        shared.write_quiet(&config.blink, blink.freq);
    }
}
