//! Typed settings on top of the blob payload
//!
//! Applications usually want a settings struct rather than raw payload
//! bytes. [`TypedConfig`] stores `T` in the payload as postcard binary data,
//! zero-padded to the payload size, and uses `T::default()` whenever the
//! stored blob is stale.

use core::marker::PhantomData;

use nvconfig_hal::ByteStore;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::defaults::PayloadDefaults;
use crate::error::ConfigError;
use crate::store::{InitOutcome, VersionedConfigStore, DEFAULT_CAPACITY};

/// Payload defaults that encode `T::default()`
pub struct PostcardDefaults<T> {
    _settings: PhantomData<fn() -> T>,
}

impl<T> PostcardDefaults<T> {
    pub const fn new() -> Self {
        Self {
            _settings: PhantomData,
        }
    }
}

impl<T> Default for PostcardDefaults<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Serialize + Default> PayloadDefaults for PostcardDefaults<T> {
    fn init_payload(&mut self, payload: &mut [u8]) {
        payload.fill(0);
        if postcard::to_slice(&T::default(), payload).is_err() {
            // Unreachable through TypedConfig::new, which checks the default fits
            warn!("default settings do not fit in payload");
            payload.fill(0);
        }
    }
}

/// Versioned config store holding a postcard-encoded `T`
pub struct TypedConfig<S, T, const N: usize = DEFAULT_CAPACITY> {
    inner: VersionedConfigStore<S, PostcardDefaults<T>, N>,
}

impl<S, T, const N: usize> TypedConfig<S, T, N>
where
    S: ByteStore,
    T: Serialize + DeserializeOwned + Default,
{
    /// Create a typed store expecting `version` and `type_tag`
    ///
    /// # Errors
    /// Same as [`VersionedConfigStore::new_with_defaults`], plus
    /// [`ConfigError::Serialize`] if `T::default()` does not fit in the
    /// payload.
    pub fn new(store: S, version: u32, type_tag: &str, size: usize) -> Result<Self, ConfigError> {
        let mut inner = VersionedConfigStore::new_with_defaults(
            store,
            PostcardDefaults::new(),
            version,
            type_tag,
            size,
        )?;

        let payload = inner.payload_mut();
        postcard::to_slice(&T::default(), payload).map_err(|_| ConfigError::Serialize)?;
        payload.fill(0);

        Ok(Self { inner })
    }

    /// Load the blob and reinitialize it if it is stale
    ///
    /// On top of the version/type check, a matching blob whose payload does
    /// not decode as `T` is treated as stale too.
    pub fn init(&mut self) -> Result<InitOutcome, ConfigError> {
        let outcome = self.inner.init()?;
        if outcome.is_up_to_date() && self.settings().is_err() {
            let found_version = self.inner.version();
            warn!("stored settings do not decode, reinitializing");
            self.inner.init_from_default();
            self.inner.save_to_store()?;
            return Ok(InitOutcome::Reinitialized { found_version });
        }
        Ok(outcome)
    }

    /// Decode the settings from the buffer
    pub fn settings(&self) -> Result<T, ConfigError> {
        postcard::from_bytes(self.inner.payload()).map_err(|_| ConfigError::Deserialize)
    }

    /// Encode `settings` into the buffer without saving
    ///
    /// On error the buffer is left unchanged.
    pub fn update(&mut self, settings: &T) -> Result<(), ConfigError> {
        let payload = self.inner.payload_mut();
        let mut scratch = [0u8; N];
        let used = postcard::to_slice(settings, &mut scratch[..payload.len()])
            .map_err(|_| ConfigError::Serialize)?
            .len();

        payload.fill(0);
        payload[..used].copy_from_slice(&scratch[..used]);
        debug!("settings encoded: {} of {} payload bytes", used, payload.len());
        Ok(())
    }

    /// Write the whole blob to the store
    pub fn save(&mut self) -> Result<(), ConfigError> {
        self.inner.save_to_store()
    }

    /// Encode `settings` and save
    pub fn store_settings(&mut self, settings: &T) -> Result<(), ConfigError> {
        self.update(settings)?;
        self.save()
    }

    pub fn inner(&self) -> &VersionedConfigStore<S, PostcardDefaults<T>, N> {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut VersionedConfigStore<S, PostcardDefaults<T>, N> {
        &mut self.inner
    }

    /// Consume the typed store and return the underlying byte store
    pub fn into_store(self) -> S {
        self.inner.into_store()
    }
}
