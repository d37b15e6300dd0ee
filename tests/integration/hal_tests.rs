//! Integration tests for the lights module: open/dispatch, the speaker
//! light, and real file writes into a temporary sysfs tree.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::Ordering;

use oemled::config::{HalFlavour, LightsConfig};
use oemled::drivers::light_state::{FlashMode, LightState};
use oemled::drivers::lights::{
    LIGHT_ID_ATTENTION, LIGHT_ID_BACKLIGHT, LIGHT_ID_BATTERY, LIGHT_ID_NOTIFICATIONS,
    LightDevice, LightsModule,
};
use oemled::drivers::sysfs::SysfsWriter;

use crate::mock_hw::MockSysfs;

fn speaker() -> (LightsModule<Arc<MockSysfs>>, Arc<MockSysfs>) {
    let sysfs = Arc::new(MockSysfs::new());
    let module = LightsModule::new(
        LightsConfig::rooted_at(Path::new("/leds"), HalFlavour::Speaker),
        Arc::clone(&sysfs),
    );
    (module, sysfs)
}

fn open<W: oemled::app::ports::BrightnessPort>(
    module: &LightsModule<W>,
    id: &str,
) -> LightDevice<W> {
    module.open(id).unwrap().into_light().unwrap()
}

fn led(name: &str) -> PathBuf {
    Path::new("/leds").join(name).join("brightness")
}

/// Latest `(red, green, blue)` levels written.
fn rgb_levels(sysfs: &MockSysfs) -> (Option<u32>, Option<u32>, Option<u32>) {
    (
        sysfs.last(&led("red")),
        sysfs.last(&led("green")),
        sysfs.last(&led("blue")),
    )
}

/// Temporary sysfs tree with an empty brightness file per LED.
fn sysfs_tree() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    for name in ["red", "green", "blue", "lcd-backlight"] {
        fs::create_dir(dir.path().join(name)).unwrap();
        fs::write(dir.path().join(name).join("brightness"), "0\n").unwrap();
    }
    dir
}

// ── Open / dispatch ───────────────────────────────────────────

#[test]
fn unknown_or_hidden_ids_are_einval() {
    let (speaker, _) = speaker();
    assert_eq!(speaker.open("keyboard").err().unwrap().errno(), -22);
    assert_eq!(speaker.open("oem_led").err().unwrap().errno(), -22);

    let oem = LightsModule::new(LightsConfig::default(), MockSysfs::new());
    for id in [LIGHT_ID_BATTERY, LIGHT_ID_NOTIFICATIONS, LIGHT_ID_ATTENTION] {
        assert_eq!(oem.open(id).err().unwrap().errno(), -22, "{id}");
    }
}

#[test]
fn module_describes_itself() {
    let (module, _) = speaker();
    let info = module.info();
    assert_eq!(info.id, "lights");
    assert_eq!((info.version_major, info.version_minor), (1, 0));
}

// ── Speaker light ─────────────────────────────────────────────

#[test]
fn battery_wins_over_notification_while_lit() {
    let (module, sysfs) = speaker();
    let notifications = open(&module, LIGHT_ID_NOTIFICATIONS);
    let battery = open(&module, LIGHT_ID_BATTERY);

    notifications.set_light(&LightState::solid(0x0000_00ff)).unwrap();
    assert_eq!(rgb_levels(&sysfs), (Some(0), Some(0), Some(2)));

    battery.set_light(&LightState::solid(0x00ff_4000)).unwrap();
    assert_eq!(rgb_levels(&sysfs), (Some(2), Some(1), Some(0)));

    // notification updates stay hidden behind the battery
    notifications.set_light(&LightState::solid(0x0000_ff00)).unwrap();
    assert_eq!(rgb_levels(&sysfs), (Some(2), Some(1), Some(0)));

    battery.set_light(&LightState::solid(0)).unwrap();
    assert_eq!(rgb_levels(&sysfs), (Some(0), Some(2), Some(0)));
}

#[test]
fn alpha_byte_does_not_light_the_battery() {
    let (module, sysfs) = speaker();
    open(&module, LIGHT_ID_NOTIFICATIONS)
        .set_light(&LightState::solid(0x0000_0080))
        .unwrap();
    open(&module, LIGHT_ID_BATTERY)
        .set_light(&LightState::solid(0xff00_0000))
        .unwrap();
    assert_eq!(rgb_levels(&sysfs), (Some(0), Some(0), Some(1)));
}

#[test]
fn dim_blue_does_not_touch_red() {
    let (module, sysfs) = speaker();
    open(&module, LIGHT_ID_NOTIFICATIONS)
        .set_light(&LightState::solid(0x0000_0010))
        .unwrap();
    assert_eq!(rgb_levels(&sysfs), (Some(0), Some(0), Some(1)));
}

#[test]
fn timed_flash_writes_blink_frequency_last() {
    let (module, sysfs) = speaker();
    open(&module, LIGHT_ID_NOTIFICATIONS)
        .set_light(&LightState::timed(0x0000_ff00, 500, 500))
        .unwrap();
    assert_eq!(
        sysfs.writes(),
        vec![
            (led("red"), 0),
            (led("green"), 2),
            (led("blue"), 0),
            (led("red"), 20),
        ]
    );
}

#[test]
fn hardware_flash_does_not_blink() {
    let (module, sysfs) = speaker();
    let state = LightState {
        color: 0x00ff_0000,
        flash_mode: FlashMode::Hardware,
        flash_on_ms: 500,
        flash_off_ms: 500,
    };
    open(&module, LIGHT_ID_NOTIFICATIONS).set_light(&state).unwrap();
    assert_eq!(sysfs.writes().len(), 3);
    assert_eq!(sysfs.last(&led("red")), Some(2));
}

#[test]
fn attention_reapplies_current_speaker_colour() {
    let (module, sysfs) = speaker();
    open(&module, LIGHT_ID_NOTIFICATIONS)
        .set_light(&LightState::solid(0x00ff_0000))
        .unwrap();
    sysfs.clear();

    let attention = LightState {
        color: 0x00ff_ffff,
        flash_mode: FlashMode::Hardware,
        flash_on_ms: 250,
        flash_off_ms: 0,
    };
    open(&module, LIGHT_ID_ATTENTION).set_light(&attention).unwrap();
    assert_eq!(module.state().attention_ms, 250);
    assert_eq!(rgb_levels(&sysfs), (Some(2), Some(0), Some(0)));
}

#[test]
fn speaker_writes_are_best_effort() {
    let sysfs = Arc::new(MockSysfs::with_missing(led("green")));
    let module = LightsModule::new(
        LightsConfig::rooted_at(Path::new("/leds"), HalFlavour::Speaker),
        Arc::clone(&sysfs),
    );
    open(&module, LIGHT_ID_BATTERY)
        .set_light(&LightState::solid(0x00ff_ffff))
        .expect("a missing channel file is not reported to the caller");
    assert_eq!(rgb_levels(&sysfs), (Some(2), None, Some(2)));
}

#[test]
fn setters_are_serialised_across_threads() {
    let (module, sysfs) = speaker();
    let workers: Vec<_> = (0..8u32)
        .map(|i| {
            let module = module.clone();
            std::thread::spawn(move || {
                let id = if i % 2 == 0 {
                    LIGHT_ID_BACKLIGHT
                } else {
                    LIGHT_ID_NOTIFICATIONS
                };
                let dev = open(&module, id);
                for n in 0..10 {
                    dev.set_light(&LightState::solid(n * 0x0001_0101)).unwrap();
                }
            })
        })
        .collect();
    for w in workers {
        w.join().unwrap();
    }

    assert!(!sysfs.overlapped.load(Ordering::SeqCst));
    // 4 backlight threads × 10 + 4 notification threads × 10 × 3 channels
    assert_eq!(sysfs.writes().len(), 40 + 120);
}

// ── Real sysfs files ──────────────────────────────────────────

#[test]
fn backlight_writes_decimal_with_newline() {
    let tree = sysfs_tree();
    let module = LightsModule::new(
        LightsConfig::rooted_at(tree.path(), HalFlavour::Oem),
        SysfsWriter::default(),
    );
    let backlight = open(&module, LIGHT_ID_BACKLIGHT);
    let file = tree.path().join("lcd-backlight/brightness");

    backlight.set_light(&LightState::solid(0xffff_ffff)).unwrap();
    assert_eq!(fs::read_to_string(&file).unwrap(), "255\n");

    backlight.set_light(&LightState::solid(0x0000_0000)).unwrap();
    assert_eq!(fs::read_to_string(&file).unwrap(), "0\n");

    backlight.close().unwrap();
}

#[test]
fn missing_backlight_file_returns_enoent() {
    let dir = tempfile::tempdir().unwrap();
    let module = LightsModule::new(
        LightsConfig::rooted_at(dir.path(), HalFlavour::Oem),
        SysfsWriter::default(),
    );
    let backlight = open(&module, LIGHT_ID_BACKLIGHT);
    for _ in 0..2 {
        let err = backlight.set_light(&LightState::solid(0x0080_8080)).unwrap_err();
        assert_eq!(err.errno(), -2);
    }
}

#[test]
fn timed_speaker_light_leaves_blink_frequency_in_red_file() {
    let tree = sysfs_tree();
    let module = LightsModule::new(
        LightsConfig::rooted_at(tree.path(), HalFlavour::Speaker),
        SysfsWriter::new(true),
    );
    open(&module, LIGHT_ID_NOTIFICATIONS)
        .set_light(&LightState::timed(0x00ff_0000, 1000, 1000))
        .unwrap();

    let read = |name: &str| fs::read_to_string(tree.path().join(name).join("brightness")).unwrap();
    assert_eq!(read("red"), "40\n");
    assert_eq!(read("green"), "0\n");
    assert_eq!(read("blue"), "0\n");
}
