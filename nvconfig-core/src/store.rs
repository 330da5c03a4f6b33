//! Versioned configuration store
//!
//! Owns the in-memory copy of the configuration blob and keeps it in sync
//! with a [`ByteStore`]. At boot, [`VersionedConfigStore::init`] decides
//! once whether the persisted copy is usable:
//!
//! ```text
//!   load blob ──► version == expected && type == expected ?
//!                     │ yes                     │ no
//!                     ▼                         ▼
//!                accept as-is        reset header + payload defaults
//!                (no write-back)     save full blob
//! ```
//!
//! There is no per-version upgrade path: any mismatch collapses straight to
//! defaults.

use core::ops::Range;

use heapless::Vec;
use nvconfig_hal::ByteStore;

use crate::blob::{self, TypeTag, MIN_BLOB_SIZE, PAYLOAD_OFFSET};
use crate::defaults::{PayloadDefaults, ZeroPayload};
use crate::error::ConfigError;

/// Buffer capacity used when none is given
pub const DEFAULT_CAPACITY: usize = 256;

/// Result of [`VersionedConfigStore::init`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InitOutcome {
    /// Stored blob matched; loaded as-is
    UpToDate,
    /// Stored blob was stale; defaults were written back
    Reinitialized {
        /// Version field found in the store before reinitialization
        found_version: u32,
    },
}

impl InitOutcome {
    /// Whether the stored blob was accepted without a write-back
    pub fn is_up_to_date(&self) -> bool {
        matches!(self, InitOutcome::UpToDate)
    }
}

/// Versioned, typed configuration blob synchronized with a byte store
///
/// `N` is the buffer capacity; the blob size chosen at construction may be
/// anything from [`MIN_BLOB_SIZE`] up to `N` and never changes afterwards.
pub struct VersionedConfigStore<S, D = ZeroPayload, const N: usize = DEFAULT_CAPACITY> {
    store: S,
    defaults: D,
    version: u32,
    type_tag: TypeTag,
    data: Vec<u8, N>,
}

impl<S: ByteStore, const N: usize> VersionedConfigStore<S, ZeroPayload, N> {
    /// Create a store expecting `version` and `type_tag`, with a zeroed
    /// buffer of `size` bytes
    ///
    /// `type_tag` is truncated to [`TYPE_MAX_LENGTH`](crate::blob::TYPE_MAX_LENGTH).
    /// Stale payloads are zero-filled; see [`new_with_defaults`](Self::new_with_defaults)
    /// to supply other defaults.
    pub fn new(store: S, version: u32, type_tag: &str, size: usize) -> Result<Self, ConfigError> {
        Self::new_with_defaults(store, ZeroPayload, version, type_tag, size)
    }
}

impl<S: ByteStore, D: PayloadDefaults, const N: usize> VersionedConfigStore<S, D, N> {
    /// Create a store with a payload defaults hook
    ///
    /// # Errors
    /// - [`ConfigError::BlobTooSmall`] if `size` cannot hold the header
    /// - [`ConfigError::Allocation`] if `size` exceeds the capacity `N`
    pub fn new_with_defaults(
        store: S,
        defaults: D,
        version: u32,
        type_tag: &str,
        size: usize,
    ) -> Result<Self, ConfigError> {
        if size < MIN_BLOB_SIZE {
            return Err(ConfigError::BlobTooSmall);
        }

        let mut data = Vec::new();
        data.resize(size, 0).map_err(|_| ConfigError::Allocation)?;

        let type_tag = TypeTag::truncated(type_tag);
        trace!("config store: version={} type={} size={}", version, type_tag.as_str(), size);

        Ok(Self {
            store,
            defaults,
            version,
            type_tag,
            data,
        })
    }

    /// Replace the payload defaults hook
    pub fn with_defaults<E: PayloadDefaults>(self, defaults: E) -> VersionedConfigStore<S, E, N> {
        VersionedConfigStore {
            store: self.store,
            defaults,
            version: self.version,
            type_tag: self.type_tag,
            data: self.data,
        }
    }

    /// Load the blob and reinitialize it if it is stale
    ///
    /// Loads the full blob from the store. If the stored version or type
    /// tag differs from the expected one, resets the buffer from defaults
    /// (header and payload) and saves it. Otherwise the loaded blob is kept
    /// and nothing is written.
    pub fn init(&mut self) -> Result<InitOutcome, ConfigError> {
        trace!("init: enter");
        self.load_from_store()?;

        let outcome = if self.is_current() {
            info!("store is up to date");
            InitOutcome::UpToDate
        } else {
            let found_version = self.version();
            warn!(
                "store not up to date, reinitializing (found version {}, expected {})",
                found_version,
                self.version
            );
            self.init_from_default();
            self.save_to_store()?;
            InitOutcome::Reinitialized { found_version }
        };

        trace!("init: exit");
        Ok(outcome)
    }

    /// Whether the buffer's header matches the expected version and type
    pub fn is_current(&self) -> bool {
        self.version() == self.version && self.type_tag_bytes() == self.type_tag.as_bytes()
    }

    /// Overwrite the whole buffer from the store, starting at offset 0
    ///
    /// On error the buffer may be partially overwritten.
    pub fn load_from_store(&mut self) -> Result<(), ConfigError> {
        trace!("load_from_store: {} bytes", self.data.len());
        self.store.begin(self.data.len())?;
        for (offset, byte) in self.data.iter_mut().enumerate() {
            *byte = self.store.read_byte(offset)?;
        }
        trace!("load_from_store: done");
        Ok(())
    }

    /// Write the whole buffer to the store and commit
    pub fn save_to_store(&mut self) -> Result<(), ConfigError> {
        self.save_range(0..self.data.len())
    }

    /// Write buffer bytes from `start` to the end of the blob, then commit
    ///
    /// Bytes land at the same offsets in the store.
    pub fn save_from(&mut self, start: usize) -> Result<(), ConfigError> {
        self.save_range(start..self.data.len())
    }

    /// Write buffer bytes in `range` to the same store offsets, then commit
    ///
    /// An empty range still commits.
    ///
    /// # Errors
    /// [`ConfigError::OutOfRange`] if the range is reversed or extends past
    /// the blob. The store is not touched in that case.
    pub fn save_range(&mut self, range: Range<usize>) -> Result<(), ConfigError> {
        if range.start > range.end || range.end > self.data.len() {
            return Err(ConfigError::OutOfRange);
        }

        trace!("save_range: {}..{}", range.start, range.end);
        self.store.begin(self.data.len())?;
        let start = range.start;
        for (i, &byte) in self.data[range].iter().enumerate() {
            self.store.write_byte(start + i, byte)?;
        }
        self.store.commit()?;
        trace!("save_range: committed");
        Ok(())
    }

    /// Reset the buffer to defaults
    ///
    /// Writes the expected version and type tag into the header and runs the
    /// payload defaults hook. Does not touch the store.
    pub fn init_from_default(&mut self) {
        trace!("init_from_default");
        blob::write_version(&mut self.data, self.version);
        blob::write_type(&mut self.data, &self.type_tag);
        self.defaults.init_payload(&mut self.data[PAYLOAD_OFFSET..]);
    }

    /// Version field of the buffer
    pub fn version(&self) -> u32 {
        blob::read_version(&self.data)
    }

    /// Set the version field of the buffer
    pub fn set_version(&mut self, version: u32) {
        blob::write_version(&mut self.data, version);
    }

    /// Type tag field of the buffer, up to its terminator
    pub fn type_tag_bytes(&self) -> &[u8] {
        blob::read_type(&self.data)
    }

    /// Type tag field of the buffer as text
    ///
    /// Returns `None` when the stored bytes are not valid UTF-8, which
    /// happens with blank or foreign store contents.
    pub fn type_tag(&self) -> Option<&str> {
        core::str::from_utf8(self.type_tag_bytes()).ok()
    }

    /// Set the type tag field, truncated to fit and NUL-terminated
    pub fn set_type(&mut self, type_tag: &str) {
        blob::write_type(&mut self.data, &TypeTag::truncated(type_tag));
    }

    /// Total blob size in bytes
    pub fn data_size(&self) -> usize {
        self.data.len()
    }

    /// Whole blob, header included
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Payload region
    pub fn payload(&self) -> &[u8] {
        &self.data[PAYLOAD_OFFSET..]
    }

    /// Payload region, for in-place updates before a save
    pub fn payload_mut(&mut self) -> &mut [u8] {
        &mut self.data[PAYLOAD_OFFSET..]
    }

    /// Version `init` expects to find in the store
    pub fn expected_version(&self) -> u32 {
        self.version
    }

    /// Type tag `init` expects to find in the store
    pub fn expected_type(&self) -> &TypeTag {
        &self.type_tag
    }

    /// Underlying byte store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Underlying byte store, mutably
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Consume the config store and return the underlying byte store
    pub fn into_store(self) -> S {
        self.store
    }
}
