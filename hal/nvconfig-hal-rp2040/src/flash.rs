//! Flash storage driver for RP2040
//!
//! Emulates an EEPROM in the last sector of flash using
//! [`NorFlashStore`](nvconfig_hal::NorFlashStore).
//!
//! Implements the `ByteStore` trait from `nvconfig-hal`.

use embassy_rp::flash::{Blocking, Flash, ERASE_SIZE};
use embassy_rp::peripherals::FLASH;
use embassy_rp::Peri;
use nvconfig_hal::NorFlashStore;

// Re-export shared types from nvconfig-hal
pub use nvconfig_hal::{ByteStore, StoreError};

/// Flash storage configuration
pub const FLASH_SIZE: usize = 2 * 1024 * 1024; // 2MB flash on Pico-class boards
pub const CONFIG_PARTITION_SIZE: usize = ERASE_SIZE; // one 4KB sector
pub const CONFIG_PARTITION_START: usize = FLASH_SIZE - CONFIG_PARTITION_SIZE;

/// Flash erase size for RP2040
pub const FLASH_ERASE_SIZE: usize = ERASE_SIZE;

/// Raw flash driver type used by the store
pub type Rp2040Flash<'d> = Flash<'d, FLASH, Blocking, FLASH_SIZE>;

/// RP2040 byte store over the config partition
pub type Rp2040Store<'d> = NorFlashStore<Rp2040Flash<'d>, CONFIG_PARTITION_SIZE>;

/// Create a byte store over the config partition
///
/// Flash access stalls XIP for the duration of erase/program, so only call
/// `commit` on the store when no other core is executing from flash.
pub fn new_store(flash: Peri<'_, FLASH>) -> Result<Rp2040Store<'_>, StoreError> {
    NorFlashStore::new(Flash::new_blocking(flash), CONFIG_PARTITION_START as u32)
}
