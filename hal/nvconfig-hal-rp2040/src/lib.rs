//! RP2040-specific HAL for nvconfig
//!
//! This crate binds the shared `nvconfig-hal` traits to the RP2040:
//!
//! - Config partition placement in on-board QSPI flash
//! - Flash-backed byte store (implements `nvconfig_hal::ByteStore`)

#![no_std]

pub mod flash;

// Re-export shared traits from nvconfig-hal for convenience
pub use flash::{new_store, Rp2040Store};
pub use nvconfig_hal::{ByteStore, StoreError};
