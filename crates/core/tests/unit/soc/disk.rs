//! Disk controller tests drive the registers through `System` and complete commands
//! by moving the clock to the scheduled disk event.

use std::io::Cursor;

use blitz_core::common::Interrupt;
use blitz_core::common::constants::SECTOR_SIZE;
use blitz_core::config::Config;
use blitz_core::object::DiskImage;
use blitz_core::soc::System;
use blitz_core::soc::devices::{DiskCommand, DiskStatus};
use pretty_assertions::assert_eq;
use rstest::rstest;

use crate::common::mocks::console::MockHostConsole;

const SECTORS: u32 = 4;

fn image_with_pattern(sector: u32, fill: u8) -> DiskImage {
    let mut image = DiskImage::format(Box::new(Cursor::new(Vec::new())), SECTORS).unwrap();
    image
        .write_sectors(sector, &vec![fill; SECTOR_SIZE as usize])
        .unwrap();
    image
}

fn system_with(config: &Config, disk: Option<DiskImage>) -> System {
    System::new(config, Box::new(MockHostConsole::silent()), disk)
}

fn program(system: &mut System, memory_addr: u32, sector: u32, count: u32, command: u32) {
    let map = system.map;
    system.write_word(map.disk_memory_addr, memory_addr).unwrap();
    system.write_word(map.disk_sector_addr, sector).unwrap();
    system.write_word(map.disk_count_addr, count).unwrap();
    system.write_word(map.disk_command_addr, command).unwrap();
}

fn complete(system: &mut System) -> u32 {
    system.scheduler.now = system.scheduler.disk;
    system.process_events().unwrap()
}

fn status(system: &mut System) -> u32 {
    let addr = system.map.disk_status_addr;
    system.read_word(addr).unwrap()
}

#[test]
fn test_read_transfers_sectors_into_memory() {
    let config = Config::default();
    let mut system = system_with(&config, Some(image_with_pattern(2, 0xA5)));
    program(&mut system, 0x4000, 2, 1, DiskCommand::Read as u32);
    assert_eq!(status(&mut system), DiskStatus::Busy as u32);
    assert_eq!(system.memory.read_word(0x4000).unwrap(), 0);

    assert_eq!(complete(&mut system), Interrupt::Disk.mask());
    assert_eq!(status(&mut system), DiskStatus::Ok as u32);
    assert_eq!(system.memory.read_word(0x4000).unwrap(), 0xA5A5_A5A5);
    assert_eq!(
        system.memory.read_word(0x4000 + SECTOR_SIZE - 4).unwrap(),
        0xA5A5_A5A5
    );
}

#[test]
fn test_write_then_read_back() {
    let config = Config::default();
    let mut system = system_with(&config, Some(image_with_pattern(0, 0)));
    system.memory.load(0x2000, b"sector payload").unwrap();
    program(&mut system, 0x2000, 1, 1, DiskCommand::Write as u32);
    complete(&mut system);
    assert_eq!(status(&mut system), DiskStatus::Ok as u32);

    program(&mut system, 0x8000, 1, 1, DiskCommand::Read as u32);
    complete(&mut system);
    assert_eq!(
        system.memory.slice(0x8000, 14).unwrap(),
        b"sector payload".as_slice()
    );
}

#[test]
fn test_completion_time_includes_seek_settle_and_rotation() {
    let mut config = Config::default();
    config.timing.disk_seek_time = 1000;
    config.timing.disk_settle_time = 100;
    config.timing.disk_rotational_delay = 10;
    config.timing.disk_jitter = 0;
    let mut system = system_with(&config, Some(image_with_pattern(0, 0)));
    program(&mut system, 0x2000, 0, 3, DiskCommand::Read as u32);
    assert_eq!(system.scheduler.disk, 130, "same track needs no seek");
}

#[test]
fn test_missing_image_reports_not_ready() {
    let config = Config::default();
    let mut system = system_with(&config, None);
    program(&mut system, 0x2000, 0, 1, DiskCommand::Read as u32);
    assert_eq!(status(&mut system), DiskStatus::Busy as u32);
    complete(&mut system);
    assert_eq!(status(&mut system), DiskStatus::NotReady as u32);
}

#[rstest]
#[case::unknown_command(0x2000, 0, 1, 7, DiskStatus::BadCommand)]
#[case::unaligned_buffer(0x2004, 0, 1, 1, DiskStatus::BadAddress)]
#[case::zero_count(0x2000, 0, 0, 1, DiskStatus::BadAddress)]
#[case::buffer_past_memory(0x00FF_E000, 0, 2, 1, DiskStatus::BadAddress)]
#[case::sectors_past_image(0x2000, 3, 2, 1, DiskStatus::BadSector)]
fn test_rejected_commands(
    #[case] memory_addr: u32,
    #[case] sector: u32,
    #[case] count: u32,
    #[case] command: u32,
    #[case] expected: DiskStatus,
) {
    let config = Config::default();
    let mut system = system_with(&config, Some(image_with_pattern(0, 0x11)));
    program(&mut system, memory_addr, sector, count, command);
    assert_eq!(status(&mut system), DiskStatus::Busy as u32);
    assert_eq!(complete(&mut system), Interrupt::Disk.mask());
    assert_eq!(status(&mut system), expected as u32);
}

#[test]
fn test_certain_read_error_is_hard() {
    let mut config = Config::default();
    config.timing.disk_read_error_ppm = 1_000_000;
    let mut system = system_with(&config, Some(image_with_pattern(0, 0x11)));
    program(&mut system, 0x2000, 0, 1, DiskCommand::Read as u32);
    complete(&mut system);
    assert_eq!(status(&mut system), DiskStatus::Hard as u32);
    assert_eq!(system.memory.read_word(0x2000).unwrap(), 0, "no DMA on failure");
}

#[test]
fn test_register_write_while_busy_requests_halt() {
    let config = Config::default();
    let mut system = system_with(&config, Some(image_with_pattern(0, 0)));
    program(&mut system, 0x2000, 0, 1, DiskCommand::Read as u32);
    let map = system.map;
    system.write_word(map.disk_sector_addr, 3).unwrap();
    assert!(system.take_halt_request());
    assert_eq!(system.disk.sector, 0);
    assert!(!system.take_halt_request());
}

#[test]
fn test_buffer_guard_only_while_busy() {
    let config = Config::default();
    let mut system = system_with(&config, Some(image_with_pattern(0, 0)));
    program(&mut system, 0x2000, 0, 1, DiskCommand::Read as u32);
    assert_eq!(
        system.disk.guard_range(),
        Some((0x2000, u64::from(0x2000 + SECTOR_SIZE)))
    );

    system.check_disk_guard(0x1FF8);
    assert!(!system.take_halt_request());
    system.check_disk_guard(0x2000 + SECTOR_SIZE - 4);
    assert!(system.take_halt_request());

    complete(&mut system);
    system.check_disk_guard(0x2000);
    assert!(!system.take_halt_request());
}
