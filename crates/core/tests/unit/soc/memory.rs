use blitz_core::common::MachineError;
use blitz_core::soc::memory::PhysicalMemory;
use pretty_assertions::assert_eq;

fn memory() -> PhysicalMemory {
    PhysicalMemory::new(0x1_0000)
}

#[test]
fn test_word_round_trip_and_byte_view() {
    let mut mem = memory();
    mem.write_word(0x100, 0x1122_3344).unwrap();
    assert_eq!(mem.read_word(0x100).unwrap(), 0x1122_3344);
    assert_eq!(mem.read_byte(0x100).unwrap(), 0x11);
    assert_eq!(mem.read_byte(0x103).unwrap(), 0x44);
}

#[test]
fn test_unaligned_word_is_fatal() {
    let mem = memory();
    assert!(matches!(
        mem.read_word(0x102),
        Err(MachineError::UnalignedAccess { addr: 0x102 })
    ));
}

#[test]
fn test_out_of_range_is_fatal() {
    let mut mem = memory();
    assert!(matches!(
        mem.write_word(0x1_0000, 1),
        Err(MachineError::AddressOutOfRange { addr: 0x1_0000 })
    ));
    assert!(mem.read_byte(0xFFFF).is_ok());
    assert!(mem.write_byte(0x1_0000, 1).is_err());
    assert!(mem.slice(0xFFF0, 0x20).is_err());
}

#[test]
fn test_lock_cycle() {
    let mut mem = memory();
    mem.write_word(0x40, 7).unwrap();
    assert_eq!(mem.read_word_locked(0x40).unwrap(), 7);
    assert_eq!(mem.locked_address(), Some(0x40));
    mem.write_word_and_unlock(0x40, 8).unwrap();
    assert_eq!(mem.locked_address(), None);
    assert_eq!(mem.read_word(0x40).unwrap(), 8);
}

#[test]
fn test_second_lock_is_double_lock() {
    let mut mem = memory();
    mem.read_word_locked(0x40).unwrap();
    let err = mem.read_word_locked(0x80).unwrap_err();
    assert!(matches!(
        err,
        MachineError::DoubleLock {
            held: 0x40,
            requested: 0x80
        }
    ));
}

#[test]
fn test_unlock_of_other_address_is_mismatch() {
    let mut mem = memory();
    assert!(matches!(
        mem.unlock(0x40),
        Err(MachineError::UnlockMismatch { held: None, addr: 0x40 })
    ));
    mem.read_word_locked(0x40).unwrap();
    assert!(matches!(
        mem.write_word_and_unlock(0x44, 0),
        Err(MachineError::UnlockMismatch {
            held: Some(0x40),
            addr: 0x44
        })
    ));
    assert_eq!(mem.read_word(0x44).unwrap(), 0, "mismatched unlock must not write");
}

#[test]
fn test_load_and_clear() {
    let mut mem = memory();
    mem.load(0x10, &[1, 2, 3, 4, 5]).unwrap();
    assert_eq!(mem.read_word(0x10).unwrap(), 0x0102_0304);
    mem.read_word_locked(0x10).unwrap();
    mem.clear();
    assert_eq!(mem.read_word(0x10).unwrap(), 0);
    assert_eq!(mem.locked_address(), None);
}
