//! nvconfig Hardware Abstraction Layer
//!
//! This crate defines the persistent byte-store trait the configuration
//! store is written against, plus two chip-independent implementations.
//! Chip-specific crates (RP2040, ...) bind these to real flash.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  nvconfig-core (VersionedConfigStore)   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  nvconfig-hal (this crate - ByteStore)  │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │   MemStore    │       │ NorFlashStore │
//! │ (host, tests) │       │  (rp2040...)  │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Types
//!
//! - [`store::ByteStore`] - Byte-addressable persistent store
//! - [`mem::MemStore`] - RAM-backed store with access counters
//! - [`nor_flash::NorFlashStore`] - Emulated EEPROM over `embedded-storage` NOR flash

#![no_std]
#![deny(unsafe_code)]

pub mod mem;
pub mod nor_flash;
pub mod store;

// Re-export key types at crate root for convenience
pub use mem::MemStore;
pub use nor_flash::NorFlashStore;
pub use store::{ByteStore, StoreError};
