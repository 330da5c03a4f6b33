//! RAM-backed byte store
//!
//! Behaves like an EEPROM with a write cache: writes land in a pending
//! image and only reach the committed image on [`ByteStore::commit`].
//! Access counters make it suitable as a test double for code that must
//! prove it did (or did not) touch the store.

use crate::store::{ByteStore, StoreError};

/// Value of a never-written byte, matching erased NOR flash
pub const ERASED: u8 = 0xFF;

/// In-memory store of `N` bytes
#[derive(Debug, Clone)]
pub struct MemStore<const N: usize> {
    pending: [u8; N],
    committed: [u8; N],
    begun: Option<usize>,
    available: bool,
    reads: usize,
    writes: usize,
    commits: usize,
}

impl<const N: usize> Default for MemStore<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> MemStore<N> {
    /// Create an erased store
    pub const fn new() -> Self {
        Self {
            pending: [ERASED; N],
            committed: [ERASED; N],
            begun: None,
            available: true,
            reads: 0,
            writes: 0,
            commits: 0,
        }
    }

    /// Create a store whose committed contents start with `image`
    ///
    /// Bytes past the end of `image` stay erased. An image longer than the
    /// store is truncated.
    pub fn with_contents(image: &[u8]) -> Self {
        let mut store = Self::new();
        let len = image.len().min(N);
        store.committed[..len].copy_from_slice(&image[..len]);
        store.pending = store.committed;
        store
    }

    /// Durable contents, as they would survive a power cycle
    pub fn committed(&self) -> &[u8] {
        &self.committed
    }

    /// Contents including writes not yet committed
    pub fn pending(&self) -> &[u8] {
        &self.pending
    }

    /// Make every subsequent operation fail with [`StoreError::Unavailable`]
    /// (or recover with `true`)
    pub fn set_available(&mut self, available: bool) {
        self.available = available;
    }

    /// Number of `read_byte` calls served
    pub fn reads(&self) -> usize {
        self.reads
    }

    /// Number of `write_byte` calls served
    pub fn writes(&self) -> usize {
        self.writes
    }

    /// Number of `commit` calls served
    pub fn commits(&self) -> usize {
        self.commits
    }

    /// Reset the access counters
    pub fn reset_counters(&mut self) {
        self.reads = 0;
        self.writes = 0;
        self.commits = 0;
    }

    /// Drop uncommitted writes, as a power loss would
    pub fn power_cycle(&mut self) {
        self.pending = self.committed;
        self.begun = None;
    }

    fn check(&self, offset: usize) -> Result<(), StoreError> {
        if !self.available {
            return Err(StoreError::Unavailable);
        }
        match self.begun {
            None => Err(StoreError::Unavailable),
            Some(size) if offset >= size => Err(StoreError::OutOfBounds),
            Some(_) => Ok(()),
        }
    }
}

impl<const N: usize> ByteStore for MemStore<N> {
    fn begin(&mut self, size: usize) -> Result<(), StoreError> {
        if !self.available {
            return Err(StoreError::Unavailable);
        }
        if size > N {
            return Err(StoreError::CapacityExceeded);
        }
        self.begun = Some(size);
        Ok(())
    }

    fn read_byte(&mut self, offset: usize) -> Result<u8, StoreError> {
        self.check(offset)?;
        self.reads += 1;
        Ok(self.pending[offset])
    }

    fn write_byte(&mut self, offset: usize, value: u8) -> Result<(), StoreError> {
        self.check(offset)?;
        self.writes += 1;
        self.pending[offset] = value;
        Ok(())
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        if !self.available || self.begun.is_none() {
            return Err(StoreError::Unavailable);
        }
        self.commits += 1;
        self.committed = self.pending;
        Ok(())
    }

    fn capacity(&self) -> usize {
        N
    }
}
