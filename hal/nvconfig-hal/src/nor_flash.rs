//! Emulated EEPROM on top of NOR flash
//!
//! NOR flash can only be erased a sector at a time, so byte-wise access is
//! served from a RAM shadow of the region:
//!
//! - `begin(size)` reads the region into the shadow
//! - `read_byte` / `write_byte` touch only the shadow
//! - `commit()` erases the covering sectors and programs the shadow back
//!
//! The store owns every flash sector the region touches, up to the end of
//! the last one: a commit erases whole sectors and programs back only the
//! region, so anything else kept in those sectors is lost.
//!
//! There is no wear leveling and no power-loss protection: a reset between
//! erase and program leaves the region erased.

use embedded_storage::nor_flash::{NorFlash, NorFlashError, NorFlashErrorKind};
use heapless::Vec;

use crate::mem::ERASED;
use crate::store::{ByteStore, StoreError};

/// Largest flash read/write granularity this adapter can pad for
pub const MAX_ALIGNMENT: usize = 32;

fn flash_error<E: NorFlashError>(e: E) -> StoreError {
    match e.kind() {
        NorFlashErrorKind::NotAligned => StoreError::Misaligned,
        NorFlashErrorKind::OutOfBounds => StoreError::OutOfBounds,
        _ => StoreError::Flash,
    }
}

const fn align_up(value: usize, alignment: usize) -> usize {
    value.div_ceil(alignment) * alignment
}

/// Byte store backed by a NOR flash region of up to `N` bytes
pub struct NorFlashStore<F, const N: usize> {
    flash: F,
    base: u32,
    shadow: Vec<u8, N>,
    begun: bool,
    dirty: bool,
}

impl<F: NorFlash, const N: usize> NorFlashStore<F, N> {
    /// Create a store over the region starting at flash offset `base`
    ///
    /// `base` must be aligned to the flash erase size.
    pub fn new(flash: F, base: u32) -> Result<Self, StoreError> {
        if base as usize % F::ERASE_SIZE != 0 {
            return Err(StoreError::Misaligned);
        }
        if F::READ_SIZE > MAX_ALIGNMENT || F::WRITE_SIZE > MAX_ALIGNMENT {
            return Err(StoreError::Misaligned);
        }
        Ok(Self {
            flash,
            base,
            shadow: Vec::new(),
            begun: false,
            dirty: false,
        })
    }

    /// Flash offset of the first byte of the region
    pub fn base(&self) -> u32 {
        self.base
    }

    /// Whether the shadow holds writes not yet committed
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Get the underlying flash for low-level access
    pub fn flash(&mut self) -> &mut F {
        &mut self.flash
    }

    /// Consume the store and return the underlying flash
    ///
    /// Uncommitted writes are lost.
    pub fn release(self) -> F {
        self.flash
    }

    fn load_shadow(&mut self) -> Result<(), StoreError> {
        let size = self.shadow.len();
        let aligned = size - size % F::READ_SIZE;

        if aligned > 0 {
            self.flash
                .read(self.base, &mut self.shadow[..aligned])
                .map_err(flash_error)?;
        }
        if aligned < size {
            let mut tail = [ERASED; MAX_ALIGNMENT];
            self.flash
                .read(self.base + aligned as u32, &mut tail[..F::READ_SIZE])
                .map_err(flash_error)?;
            self.shadow[aligned..].copy_from_slice(&tail[..size - aligned]);
        }
        Ok(())
    }

    fn program_shadow(&mut self) -> Result<(), StoreError> {
        let size = self.shadow.len();
        if size == 0 {
            return Ok(());
        }

        let erase_end = self.base + align_up(size, F::ERASE_SIZE) as u32;
        self.flash
            .erase(self.base, erase_end)
            .map_err(flash_error)?;

        let aligned = size - size % F::WRITE_SIZE;
        if aligned > 0 {
            self.flash
                .write(self.base, &self.shadow[..aligned])
                .map_err(flash_error)?;
        }
        if aligned < size {
            let mut tail = [ERASED; MAX_ALIGNMENT];
            tail[..size - aligned].copy_from_slice(&self.shadow[aligned..]);
            self.flash
                .write(self.base + aligned as u32, &tail[..F::WRITE_SIZE])
                .map_err(flash_error)?;
        }
        Ok(())
    }
}

impl<F: NorFlash, const N: usize> ByteStore for NorFlashStore<F, N> {
    fn begin(&mut self, size: usize) -> Result<(), StoreError> {
        if size > N {
            return Err(StoreError::CapacityExceeded);
        }
        let end = align_up(self.base as usize + size, F::ERASE_SIZE);
        if end > self.flash.capacity() {
            return Err(StoreError::OutOfBounds);
        }

        self.begun = false;
        self.dirty = false;
        self.shadow.clear();
        self.shadow
            .resize(size, ERASED)
            .map_err(|_| StoreError::CapacityExceeded)?;
        self.load_shadow()?;
        self.begun = true;
        Ok(())
    }

    fn read_byte(&mut self, offset: usize) -> Result<u8, StoreError> {
        if !self.begun {
            return Err(StoreError::Unavailable);
        }
        self.shadow
            .get(offset)
            .copied()
            .ok_or(StoreError::OutOfBounds)
    }

    fn write_byte(&mut self, offset: usize, value: u8) -> Result<(), StoreError> {
        if !self.begun {
            return Err(StoreError::Unavailable);
        }
        let slot = self
            .shadow
            .get_mut(offset)
            .ok_or(StoreError::OutOfBounds)?;
        if *slot != value {
            *slot = value;
            self.dirty = true;
        }
        Ok(())
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        if !self.begun {
            return Err(StoreError::Unavailable);
        }
        if !self.dirty {
            return Ok(());
        }
        self.program_shadow()?;
        self.dirty = false;
        Ok(())
    }

    fn capacity(&self) -> usize {
        let available = self.flash.capacity().saturating_sub(self.base as usize);
        available.min(N)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_storage::nor_flash::{ErrorType, ReadNorFlash};

    const FLASH_BYTES: usize = 256;
    const SECTOR: usize = 64;

    #[derive(Debug)]
    struct MockError(NorFlashErrorKind);

    impl NorFlashError for MockError {
        fn kind(&self) -> NorFlashErrorKind {
            self.0
        }
    }

    /// NOR flash with `R`-byte reads and 4-byte programs that only clear bits
    struct MockFlash<const R: usize> {
        data: [u8; FLASH_BYTES],
        erases: usize,
        programs: usize,
    }

    type ByteFlash = MockFlash<1>;
    type WordFlash = MockFlash<4>;

    impl<const R: usize> MockFlash<R> {
        fn new() -> Self {
            Self {
                data: [ERASED; FLASH_BYTES],
                erases: 0,
                programs: 0,
            }
        }
    }

    impl<const R: usize> ErrorType for MockFlash<R> {
        type Error = MockError;
    }

    impl<const R: usize> ReadNorFlash for MockFlash<R> {
        const READ_SIZE: usize = R;

        fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
            let start = offset as usize;
            if start % R != 0 || bytes.len() % R != 0 {
                return Err(MockError(NorFlashErrorKind::NotAligned));
            }
            let end = start + bytes.len();
            if end > FLASH_BYTES {
                return Err(MockError(NorFlashErrorKind::OutOfBounds));
            }
            bytes.copy_from_slice(&self.data[start..end]);
            Ok(())
        }

        fn capacity(&self) -> usize {
            FLASH_BYTES
        }
    }

    impl<const R: usize> NorFlash for MockFlash<R> {
        const WRITE_SIZE: usize = 4;
        const ERASE_SIZE: usize = SECTOR;

        fn erase(&mut self, from: u32, to: u32) -> Result<(), Self::Error> {
            let (from, to) = (from as usize, to as usize);
            if from % SECTOR != 0 || to % SECTOR != 0 {
                return Err(MockError(NorFlashErrorKind::NotAligned));
            }
            if to > FLASH_BYTES {
                return Err(MockError(NorFlashErrorKind::OutOfBounds));
            }
            self.data[from..to].fill(ERASED);
            self.erases += 1;
            Ok(())
        }

        fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error> {
            let start = offset as usize;
            if start % Self::WRITE_SIZE != 0 || bytes.len() % Self::WRITE_SIZE != 0 {
                return Err(MockError(NorFlashErrorKind::NotAligned));
            }
            if start + bytes.len() > FLASH_BYTES {
                return Err(MockError(NorFlashErrorKind::OutOfBounds));
            }
            for (cell, &b) in self.data[start..].iter_mut().zip(bytes) {
                *cell &= b;
            }
            self.programs += 1;
            Ok(())
        }
    }

    #[test]
    fn test_rejects_unaligned_base() {
        let result = NorFlashStore::<_, 64>::new(ByteFlash::new(), 10);
        assert!(matches!(result, Err(StoreError::Misaligned)));
    }

    #[test]
    fn test_begin_loads_region_from_flash() {
        let mut flash = ByteFlash::new();
        flash.data[64..67].copy_from_slice(&[1, 2, 3]);

        let mut store = NorFlashStore::<_, 64>::new(flash, 64).unwrap();
        store.begin(5).unwrap();

        assert_eq!(store.read_byte(0), Ok(1));
        assert_eq!(store.read_byte(2), Ok(3));
        assert_eq!(store.read_byte(3), Ok(ERASED));
        assert_eq!(store.read_byte(5), Err(StoreError::OutOfBounds));
    }

    #[test]
    fn test_begin_rejects_region_past_flash_end() {
        let mut store = NorFlashStore::<_, 128>::new(ByteFlash::new(), 192).unwrap();
        assert_eq!(store.begin(65), Err(StoreError::OutOfBounds));
        assert!(store.begin(64).is_ok());
    }

    #[test]
    fn test_begin_rejects_size_over_capacity() {
        let mut store = NorFlashStore::<_, 16>::new(ByteFlash::new(), 0).unwrap();
        assert_eq!(store.begin(17), Err(StoreError::CapacityExceeded));
    }

    #[test]
    fn test_commit_programs_unaligned_tail() {
        let mut store = NorFlashStore::<_, 64>::new(ByteFlash::new(), 0).unwrap();
        store.begin(7).unwrap();
        for i in 0..7 {
            store.write_byte(i, i as u8).unwrap();
        }
        store.commit().unwrap();

        let flash = store.release();
        assert_eq!(&flash.data[..7], &[0, 1, 2, 3, 4, 5, 6]);
        assert_eq!(flash.data[7], ERASED);
        assert_eq!(flash.erases, 1);
    }

    #[test]
    fn test_rewrite_after_erase_sets_bits_again() {
        let mut store = NorFlashStore::<_, 64>::new(ByteFlash::new(), 0).unwrap();
        store.begin(4).unwrap();
        store.write_byte(0, 0x00).unwrap();
        store.commit().unwrap();

        store.begin(4).unwrap();
        store.write_byte(0, 0xA5).unwrap();
        store.commit().unwrap();

        store.begin(4).unwrap();
        assert_eq!(store.read_byte(0), Ok(0xA5));
    }

    #[test]
    fn test_clean_commit_skips_flash() {
        let mut flash = ByteFlash::new();
        flash.data[0] = 7;
        let mut store = NorFlashStore::<_, 64>::new(flash, 0).unwrap();
        store.begin(8).unwrap();

        // Rewriting the same value does not dirty the shadow
        store.write_byte(0, 7).unwrap();
        assert!(!store.is_dirty());
        store.commit().unwrap();

        let flash = store.release();
        assert_eq!(flash.erases, 0);
        assert_eq!(flash.programs, 0);
    }

    #[test]
    fn test_access_requires_begin() {
        let mut store = NorFlashStore::<_, 64>::new(ByteFlash::new(), 0).unwrap();
        assert_eq!(store.read_byte(0), Err(StoreError::Unavailable));
        assert_eq!(store.commit(), Err(StoreError::Unavailable));
    }

    #[test]
    fn test_capacity_is_bounded_by_flash_and_shadow() {
        let store = NorFlashStore::<_, 512>::new(ByteFlash::new(), 128).unwrap();
        assert_eq!(store.capacity(), 128);

        let store = NorFlashStore::<_, 32>::new(ByteFlash::new(), 0).unwrap();
        assert_eq!(store.capacity(), 32);
    }

    #[test]
    fn test_word_reads_with_unaligned_size() {
        let mut store = NorFlashStore::<_, 64>::new(WordFlash::new(), 64).unwrap();
        store.begin(27).unwrap();
        assert!((0..27).all(|i| store.read_byte(i) == Ok(ERASED)));

        for i in 0..27 {
            store.write_byte(i, 0x40 + i as u8).unwrap();
        }
        store.commit().unwrap();

        store.begin(27).unwrap();
        for i in 0..27 {
            assert_eq!(store.read_byte(i), Ok(0x40 + i as u8));
        }

        let flash = store.release();
        assert_eq!(flash.data[64 + 27], ERASED);
    }
}
