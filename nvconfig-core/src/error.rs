//! Configuration store errors

use nvconfig_hal::StoreError;

/// Configuration store errors
///
/// A stale or mismatched blob is not an error: `init` handles it by
/// reinitializing from defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Persistent store operation failed
    Store(StoreError),
    /// Requested blob size cannot hold the header
    BlobTooSmall,
    /// Requested blob size exceeds the buffer capacity
    Allocation,
    /// Byte range lies outside the blob
    OutOfRange,
    /// Settings do not fit in the payload
    Serialize,
    /// Payload does not decode as the expected settings
    Deserialize,
}

impl From<StoreError> for ConfigError {
    fn from(e: StoreError) -> Self {
        ConfigError::Store(e)
    }
}
