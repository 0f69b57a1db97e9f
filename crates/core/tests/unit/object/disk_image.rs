use std::io::Cursor;

use blitz_core::common::constants::SECTOR_SIZE;
use blitz_core::common::endian::word_to_bytes;
use blitz_core::object::{DISK_MAGIC, DiskImage, FormatError};
use pretty_assertions::assert_eq;
use tempfile::tempdir;

#[test]
fn test_create_then_open() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("DISK");
    {
        let mut disk = DiskImage::create(&path, 3).unwrap();
        disk.write_sectors(2, &vec![7u8; SECTOR_SIZE as usize]).unwrap();
    }
    let len = std::fs::metadata(&path).unwrap().len();
    assert_eq!(len, 4 + 3 * u64::from(SECTOR_SIZE));

    let mut disk = DiskImage::open(&path).unwrap();
    assert_eq!(disk.sector_count(), 3);
    let mut buf = vec![0u8; SECTOR_SIZE as usize];
    disk.read_sectors(2, &mut buf).unwrap();
    assert!(buf.iter().all(|b| *b == 7));
}

#[test]
fn test_open_rejects_wrong_magic() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("DISK");
    std::fs::write(&path, [0u8; 16]).unwrap();
    assert!(matches!(
        DiskImage::open(&path),
        Err(FormatError::BadMagic { expected: DISK_MAGIC, found: 0 })
    ));
}

#[test]
fn test_empty_file_is_truncated() {
    let result = DiskImage::from_storage(Box::new(Cursor::new(Vec::new())));
    assert!(matches!(result, Err(FormatError::Truncated { offset: 0 })));
}

#[test]
fn test_partial_trailing_sector_is_ignored() {
    let mut bytes = word_to_bytes(DISK_MAGIC).to_vec();
    bytes.resize(4 + SECTOR_SIZE as usize + 100, 0);
    let disk = DiskImage::from_storage(Box::new(Cursor::new(bytes))).unwrap();
    assert_eq!(disk.sector_count(), 1);
}

#[test]
fn test_access_past_the_end() {
    let mut disk = DiskImage::format(Box::new(Cursor::new(Vec::new())), 2).unwrap();
    let mut buf = vec![0u8; 2 * SECTOR_SIZE as usize];
    assert!(matches!(
        disk.read_sectors(1, &mut buf),
        Err(FormatError::SectorOutOfRange { first: 1, end: 3, sectors: 2 })
    ));
    assert!(disk.read_sectors(0, &mut buf).is_ok());
}
