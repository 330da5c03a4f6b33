//! Word-granular NOR flash for exercising the stores over `NorFlashStore`

use embedded_storage::nor_flash::{
    ErrorType, NorFlash, NorFlashError, NorFlashErrorKind, ReadNorFlash,
};
use nvconfig_hal::NorFlashStore;

pub const FLASH_BYTES: usize = 256;
pub const SECTOR: usize = 64;

/// Region base used by the tests, one sector in
pub const BASE: u32 = SECTOR as u32;

#[derive(Debug)]
pub struct WordFlashError(NorFlashErrorKind);

impl NorFlashError for WordFlashError {
    fn kind(&self) -> NorFlashErrorKind {
        self.0
    }
}

/// Flash with 4-byte reads and programs; programming only clears bits
pub struct WordFlash {
    pub data: [u8; FLASH_BYTES],
}

impl WordFlash {
    pub fn new() -> Self {
        Self {
            data: [0xFF; FLASH_BYTES],
        }
    }

    /// Flash whose region at [`BASE`] starts with `image`
    pub fn with_region(image: &[u8]) -> Self {
        let mut flash = Self::new();
        let start = BASE as usize;
        flash.data[start..start + image.len()].copy_from_slice(image);
        flash
    }

    pub fn region(&self) -> &[u8] {
        &self.data[BASE as usize..]
    }

    /// Byte store over the region at [`BASE`]
    pub fn into_store(self) -> NorFlashStore<Self, 64> {
        NorFlashStore::new(self, BASE).unwrap()
    }

    fn check(offset: u32, len: usize, align: usize) -> Result<usize, WordFlashError> {
        let start = offset as usize;
        if start % align != 0 || len % align != 0 {
            return Err(WordFlashError(NorFlashErrorKind::NotAligned));
        }
        if start + len > FLASH_BYTES {
            return Err(WordFlashError(NorFlashErrorKind::OutOfBounds));
        }
        Ok(start)
    }
}

impl ErrorType for WordFlash {
    type Error = WordFlashError;
}

impl ReadNorFlash for WordFlash {
    const READ_SIZE: usize = 4;

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        let start = Self::check(offset, bytes.len(), Self::READ_SIZE)?;
        bytes.copy_from_slice(&self.data[start..start + bytes.len()]);
        Ok(())
    }

    fn capacity(&self) -> usize {
        FLASH_BYTES
    }
}

impl NorFlash for WordFlash {
    const WRITE_SIZE: usize = 4;
    const ERASE_SIZE: usize = SECTOR;

    fn erase(&mut self, from: u32, to: u32) -> Result<(), Self::Error> {
        let start = Self::check(from, (to - from) as usize, SECTOR)?;
        self.data[start..to as usize].fill(0xFF);
        Ok(())
    }

    fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error> {
        let start = Self::check(offset, bytes.len(), Self::WRITE_SIZE)?;
        for (cell, &b) in self.data[start..].iter_mut().zip(bytes) {
            *cell &= b;
        }
        Ok(())
    }
}
