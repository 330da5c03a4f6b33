//! Byte-addressable persistent storage abstractions
//!
//! Provides the collaborator trait the configuration store is written
//! against. Implementations wrap EEPROM, emulated EEPROM on top of flash,
//! or plain RAM for host-side testing.

/// Errors from persistent store operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError {
    /// Store is not available (not begun, or the medium is not responding)
    Unavailable,
    /// Offset lies outside the begun region
    OutOfBounds,
    /// Requested size exceeds what the store can hold
    CapacityExceeded,
    /// Underlying flash operation failed
    Flash,
    /// Flash read/write granularity cannot be honored
    Misaligned,
}

/// Byte-addressable persistent store
///
/// Models an EEPROM-style medium: the caller declares how many bytes it
/// intends to use with [`begin`](ByteStore::begin), accesses them one byte at
/// a time, then makes pending writes durable with
/// [`commit`](ByteStore::commit).
///
/// All operations are synchronous. A store is assumed to be exclusively
/// owned by its caller for the duration of each call.
pub trait ByteStore {
    /// Prepare the store for access to `size` bytes starting at offset 0
    ///
    /// May be called more than once; each call re-establishes the region.
    fn begin(&mut self, size: usize) -> Result<(), StoreError>;

    /// Read one byte at `offset`
    fn read_byte(&mut self, offset: usize) -> Result<u8, StoreError>;

    /// Write one byte at `offset`
    ///
    /// The write is not guaranteed to be durable until [`commit`](ByteStore::commit).
    fn write_byte(&mut self, offset: usize, value: u8) -> Result<(), StoreError>;

    /// Durably flush pending writes
    fn commit(&mut self) -> Result<(), StoreError>;

    /// Total number of bytes the store can hold
    fn capacity(&self) -> usize;
}

impl<T: ByteStore + ?Sized> ByteStore for &mut T {
    fn begin(&mut self, size: usize) -> Result<(), StoreError> {
        (**self).begin(size)
    }

    fn read_byte(&mut self, offset: usize) -> Result<u8, StoreError> {
        (**self).read_byte(offset)
    }

    fn write_byte(&mut self, offset: usize, value: u8) -> Result<(), StoreError> {
        (**self).write_byte(offset, value)
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        (**self).commit()
    }

    fn capacity(&self) -> usize {
        (**self).capacity()
    }
}
