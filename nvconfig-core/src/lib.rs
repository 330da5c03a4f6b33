//! Versioned configuration blob persistence
//!
//! Keeps a fixed-size configuration blob in RAM, restores it from a
//! persistent [`ByteStore`](nvconfig_hal::ByteStore) at boot and discards it
//! in favor of defaults when the stored schema version or type tag does not
//! match what the firmware expects:
//!
//! - Blob layout and type tag handling ([`blob`])
//! - Load/validate/save logic ([`store::VersionedConfigStore`])
//! - Payload default hooks ([`defaults`])
//! - Postcard-encoded settings structs ([`typed::TypedConfig`])

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod blob;
pub mod defaults;
pub mod error;
pub mod store;
pub mod typed;

#[cfg(test)]
mod test_flash;

pub use blob::{TypeTag, HEADER_LEN, TYPE_MAX_LENGTH};
pub use defaults::{FillPayload, KeepPayload, PayloadDefaults, ZeroPayload};
pub use error::ConfigError;
pub use store::{InitOutcome, VersionedConfigStore, DEFAULT_CAPACITY};
pub use typed::{PostcardDefaults, TypedConfig};
