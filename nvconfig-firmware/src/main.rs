//! nvconfig example firmware
//!
//! Restores `DeviceSettings` from the config partition at boot, counts the
//! boot, saves, then logs a heartbeat. Flash a build with a different
//! `SETTINGS_VERSION` or `SETTINGS_TYPE` to watch the stored copy get
//! replaced by defaults.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::peripherals::FLASH;
use embassy_rp::Peri;
use embassy_time::{Duration, Timer};
use {defmt_rtt as _, panic_probe as _};

use nvconfig_core::{ConfigError, InitOutcome, TypedConfig};
use nvconfig_hal_rp2040::Rp2040Store;

mod settings;

use settings::{DeviceSettings, SETTINGS_CAPACITY, SETTINGS_SIZE, SETTINGS_TYPE, SETTINGS_VERSION};

type SettingsStore<'d> = TypedConfig<Rp2040Store<'d>, DeviceSettings, SETTINGS_CAPACITY>;

/// Main entry point
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("nvconfig firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let settings = match restore_settings(p.FLASH) {
        Ok(settings) => settings,
        Err(e) => {
            warn!("Settings store unavailable: {:?}, running on defaults", e);
            DeviceSettings::default()
        }
    };
    info!("Settings: {}", settings);

    let interval = Duration::from_millis(settings.heartbeat_ms.max(100) as u64);
    loop {
        info!("heartbeat (boot #{})", settings.boot_count);
        Timer::after(interval).await;
    }
}

/// Load settings from flash, bump the boot counter and save
fn restore_settings(flash: Peri<'static, FLASH>) -> Result<DeviceSettings, ConfigError> {
    let store = nvconfig_hal_rp2040::new_store(flash)?;
    let mut config = SettingsStore::new(store, SETTINGS_VERSION, SETTINGS_TYPE, SETTINGS_SIZE)?;

    match config.init()? {
        InitOutcome::UpToDate => info!("Loaded settings v{} from flash", SETTINGS_VERSION),
        InitOutcome::Reinitialized { found_version } => info!(
            "Replaced settings v{} with v{} defaults",
            found_version, SETTINGS_VERSION
        ),
    }

    // Every boot erases and reprograms the 4KB config sector. Fine for a
    // demo; RP2040 flash is rated for about 100k erase cycles per sector.
    let mut settings = config.settings()?;
    settings.boot_count = settings.boot_count.wrapping_add(1);
    config.store_settings(&settings)?;

    Ok(settings)
}
