//! Persisted device settings
//!
//! Identity and size of the settings blob are fixed at compile time. Bump
//! `SETTINGS_VERSION` whenever `DeviceSettings` changes shape; the stored
//! copy is then replaced by defaults on the next boot.

use nvconfig_hal_rp2040::flash::CONFIG_PARTITION_SIZE;
use serde::{Deserialize, Serialize};

/// Schema revision of `DeviceSettings`
pub const SETTINGS_VERSION: u32 = 1;

/// Configuration kind this firmware build expects
pub const SETTINGS_TYPE: &str = "nvconfig-pico";

/// Blob size in bytes (header + payload)
pub const SETTINGS_SIZE: usize = 64;

/// In-memory buffer capacity
pub const SETTINGS_CAPACITY: usize = 64;

const _: () = assert!(SETTINGS_SIZE <= SETTINGS_CAPACITY);
const _: () = assert!(SETTINGS_SIZE <= CONFIG_PARTITION_SIZE);

/// Settings restored at boot
#[derive(Debug, Clone, Serialize, Deserialize, defmt::Format)]
pub struct DeviceSettings {
    /// Number of boots since the settings were last reset
    pub boot_count: u32,
    /// Heartbeat log interval in milliseconds
    pub heartbeat_ms: u32,
    /// Status LED brightness (0-255)
    pub led_brightness: u8,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            boot_count: 0,
            heartbeat_ms: 5000,
            led_brightness: 64,
        }
    }
}
