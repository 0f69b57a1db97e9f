//! Disk Image Files.
//!
//! A disk image is the magic word followed by whole 8192-byte sectors; sector `n`
//! starts at byte `4 + n * 8192`. Sector 0 may hold a stub file system, which the
//! emulator does not interpret.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use super::DISK_MAGIC;
use super::error::FormatError;
use crate::common::constants::SECTOR_SIZE;
use crate::common::endian::{word_from_bytes, word_to_bytes};

/// Byte offset of sector 0.
const HEADER_SIZE: u64 = 4;

/// Backing storage for a disk image.
pub trait DiskStorage: Read + Write + Seek {}

impl<T: Read + Write + Seek> DiskStorage for T {}

/// An open disk image.
pub struct DiskImage {
    storage: Box<dyn DiskStorage>,
    sectors: u32,
}

impl fmt::Debug for DiskImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiskImage")
            .field("sectors", &self.sectors)
            .finish_non_exhaustive()
    }
}

impl DiskImage {
    /// Opens an existing image read-write and checks its magic word.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, FormatError> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        Self::from_storage(Box::new(file))
    }

    /// Creates a zero-filled image with `sectors` sectors.
    pub fn create(path: impl AsRef<Path>, sectors: u32) -> Result<Self, FormatError> {
        let file = File::create(path)?;
        Self::format(Box::new(file), sectors)
    }

    /// Writes a fresh image into `storage`.
    pub fn format(mut storage: Box<dyn DiskStorage>, sectors: u32) -> Result<Self, FormatError> {
        storage.seek(SeekFrom::Start(0))?;
        storage.write_all(&word_to_bytes(DISK_MAGIC))?;
        let zero = vec![0u8; SECTOR_SIZE as usize];
        for _ in 0..sectors {
            storage.write_all(&zero)?;
        }
        storage.flush()?;
        Ok(Self { storage, sectors })
    }

    /// Wraps existing storage, checking the magic word and sizing the image.
    ///
    /// A trailing partial sector is ignored.
    pub fn from_storage(mut storage: Box<dyn DiskStorage>) -> Result<Self, FormatError> {
        let len = storage.seek(SeekFrom::End(0))?;
        storage.seek(SeekFrom::Start(0))?;
        let mut magic = [0u8; 4];
        storage
            .read_exact(&mut magic)
            .map_err(|_| FormatError::Truncated { offset: 0 })?;
        let found = word_from_bytes(magic);
        if found != DISK_MAGIC {
            return Err(FormatError::BadMagic {
                expected: DISK_MAGIC,
                found,
            });
        }
        let sectors = ((len - HEADER_SIZE) / u64::from(SECTOR_SIZE)) as u32;
        Ok(Self { storage, sectors })
    }

    /// Number of whole sectors in the image.
    pub fn sector_count(&self) -> u32 {
        self.sectors
    }

    fn seek_to(&mut self, first: u32, len: usize) -> Result<(), FormatError> {
        let count = (len as u64).div_ceil(u64::from(SECTOR_SIZE));
        let end = u64::from(first) + count;
        if end > u64::from(self.sectors) {
            return Err(FormatError::SectorOutOfRange {
                first,
                end,
                sectors: self.sectors,
            });
        }
        let offset = HEADER_SIZE + u64::from(first) * u64::from(SECTOR_SIZE);
        self.storage.seek(SeekFrom::Start(offset))?;
        Ok(())
    }

    /// Reads consecutive sectors starting at `first` into `buf`.
    pub fn read_sectors(&mut self, first: u32, buf: &mut [u8]) -> Result<(), FormatError> {
        self.seek_to(first, buf.len())?;
        self.storage.read_exact(buf)?;
        Ok(())
    }

    /// Writes `data` to consecutive sectors starting at `first`.
    pub fn write_sectors(&mut self, first: u32, data: &[u8]) -> Result<(), FormatError> {
        self.seek_to(first, data.len())?;
        self.storage.write_all(data)?;
        self.storage.flush()?;
        Ok(())
    }
}
