//! OEM bridge: the service's [`LedPort`] on top of the OEM light device.
//!
//! Opens `oem_led` once at start-up. If the module does not expose it the
//! bridge stays up without a device and drops every request with an error
//! log, so the service keeps running on boards without the LED bar.

use log::{debug, error, warn};

use crate::app::ports::{BrightnessPort, LedPort};
use crate::drivers::light_state::OemLightState;
use crate::drivers::lights::{LIGHT_ID_OEM_LED, LightsModule, OemLightDevice};

pub struct OemBridge<W> {
    light: Option<OemLightDevice<W>>,
}

impl<W: BrightnessPort> OemBridge<W> {
    pub fn init(module: &LightsModule<W>) -> Self {
        let light = match module.open(LIGHT_ID_OEM_LED).and_then(|d| d.into_oem()) {
            Ok(dev) => Some(dev),
            Err(e) => {
                warn!("OEM LED unavailable: {e}");
                None
            }
        };
        Self { light }
    }

    pub fn is_connected(&self) -> bool {
        self.light.is_some()
    }
}

impl<W: BrightnessPort> LedPort for OemBridge<W> {
    fn set_led(&self, state: &OemLightState) {
        let Some(light) = &self.light else {
            error!("setLed: light is null");
            return;
        };
        debug!(
            "setLed: leds : {:08x?}, onMs: {}, offMs: {}, option: {}",
            state.leds, state.flash_on_ms, state.flash_off_ms, state.option
        );
        if let Err(e) = light.set_light(state) {
            error!("setLed: {e}");
        }
    }
}
