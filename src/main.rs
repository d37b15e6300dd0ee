//! `oemled`: drive the lights module and LED manager from the shell.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │  CLI                                                   │
//! │   set / oem ──▶ LightsModule::open ──▶ setter ──▶ sysfs │
//! │   play      ──▶ LedManagerService ──▶ OemBridge ──┘     │
//! └────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use log::info;

use oemled::adapters::log_sink::LogEventSink;
use oemled::adapters::oem_bridge::OemBridge;
use oemled::app::led_info::LedInfo;
use oemled::app::service::LedManagerService;
use oemled::config::{HalFlavour, LightsConfig};
use oemled::drivers::light_state::{FlashMode, LightState, OEM_LED_COUNT, OemLightState};
use oemled::drivers::lights::LightsModule;
use oemled::drivers::sysfs::SysfsWriter;

/// Lights HAL and LED manager for sysfs indicator LEDs.
#[derive(Parser)]
#[command(version)]
struct Cli {
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Use `<DIR>/<led>/brightness` instead of the configured sysfs paths
    #[arg(long)]
    sysfs_root: Option<PathBuf>,

    /// Override the HAL flavour
    #[arg(long)]
    flavour: Option<Flavour>,

    /// Log every non-backlight sysfs write
    #[arg(long)]
    trace_writes: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum Flavour {
    Oem,
    Speaker,
}

impl From<Flavour> for HalFlavour {
    fn from(f: Flavour) -> Self {
        match f {
            Flavour::Oem => Self::Oem,
            Flavour::Speaker => Self::Speaker,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Flash {
    None,
    Timed,
    Hardware,
}

#[derive(Subcommand)]
enum Command {
    /// Print the module description and configuration
    Info,

    /// Set a single-channel light (backlight, battery, notifications, attention)
    Set {
        light: String,

        /// Colour as 0xRRGGBB
        #[arg(value_parser = parse_colour)]
        colour: u32,

        #[arg(long, value_enum, default_value = "none")]
        flash: Flash,

        #[arg(long, default_value_t = 0)]
        on_ms: u32,

        #[arg(long, default_value_t = 0)]
        off_ms: u32,
    },

    /// Send a 7-channel state to the OEM LED bar
    Oem {
        /// Seven comma-separated channel values (hex with 0x, or decimal)
        #[arg(value_delimiter = ',', value_parser = parse_colour)]
        leds: Vec<u32>,

        #[arg(long, default_value_t = 0)]
        on_ms: u32,

        #[arg(long, default_value_t = 0)]
        off_ms: u32,

        #[arg(long, default_value_t = 0)]
        option: i32,
    },

    /// Post LED events from JSON files to the manager and let them play
    Play {
        files: Vec<PathBuf>,

        /// Give up waiting for the LED bar to go idle after this many seconds
        #[arg(long, default_value_t = 30)]
        hold_secs: u64,
    },
}

fn parse_colour(s: &str) -> Result<u32, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("{s}: {e}"))
}

fn load_config(cli: &Cli) -> Result<LightsConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            LightsConfig::from_json(&json)?
        }
        None => LightsConfig::default(),
    };
    if let Some(root) = &cli.sysfs_root {
        config = LightsConfig::rooted_at(root, config.flavour);
    }
    if let Some(flavour) = cli.flavour {
        config.flavour = flavour.into();
    }
    config.trace_writes |= cli.trace_writes;
    Ok(config)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let writer = SysfsWriter::new(config.trace_writes);
    let module = LightsModule::new(config, writer);

    match cli.command {
        Command::Info => {
            let m = module.info();
            println!(
                "{} ({}) v{}.{} by {}",
                m.name, m.id, m.version_major, m.version_minor, m.author
            );
            println!("{}", serde_json::to_string_pretty(module.config())?);
        }
        Command::Set {
            light,
            colour,
            flash,
            on_ms,
            off_ms,
        } => {
            let device = module.open(&light)?.into_light()?;
            let state = LightState {
                color: colour,
                flash_mode: match flash {
                    Flash::None => FlashMode::None,
                    Flash::Timed => FlashMode::Timed,
                    Flash::Hardware => FlashMode::Hardware,
                },
                flash_on_ms: on_ms,
                flash_off_ms: off_ms,
            };
            if let Err(e) = device.set_light(&state) {
                bail!("set_light({light}) failed: {e} (errno {})", e.errno());
            }
            device.close()?;
        }
        Command::Oem {
            leds,
            on_ms,
            off_ms,
            option,
        } => {
            let Ok(leds) = <[u32; OEM_LED_COUNT]>::try_from(leds.as_slice()) else {
                bail!("expected {OEM_LED_COUNT} channel values, got {}", leds.len());
            };
            let device = module.open(oemled::drivers::lights::LIGHT_ID_OEM_LED)?.into_oem()?;
            device.set_light(&OemLightState {
                leds,
                flash_on_ms: on_ms,
                flash_off_ms: off_ms,
                option,
            })?;
            device.close()?;
        }
        Command::Play { files, hold_secs } => {
            let service = LedManagerService::new(OemBridge::init(&module), LogEventSink::new());
            let client = service.client();
            for path in &files {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                let event = LedInfo::from_json(&json)
                    .with_context(|| format!("parsing {}", path.display()))?;
                info!("posting {}", path.display());
                client.post_event(event)?;
            }

            let deadline = Instant::now() + Duration::from_secs(hold_secs);
            while service.current_app_id().is_some() && Instant::now() < deadline {
                std::thread::sleep(Duration::from_millis(50));
            }
            print!("{}", service.dump());
        }
    }

    Ok(())
}
