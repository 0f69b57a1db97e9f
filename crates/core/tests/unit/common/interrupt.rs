//! # Interrupt Class Tests

use blitz_core::common::Interrupt;
use rstest::rstest;

#[test]
fn test_index_matches_bit_position() {
    for (i, class) in Interrupt::ALL.into_iter().enumerate() {
        assert_eq!(class.index(), i);
        assert_eq!(class.mask(), 1 << i);
        assert_eq!(class.vector(), 4 * i as u32);
    }
}

#[test]
fn test_priority_lists_every_class_once() {
    let mut seen = 0u32;
    for class in Interrupt::PRIORITY {
        assert_eq!(seen & class.mask(), 0, "{class} listed twice");
        seen |= class.mask();
    }
    assert_eq!(seen, 0x3FFF);
    assert_eq!(Interrupt::PRIORITY[0], Interrupt::PowerOnReset);
}

#[rstest]
#[case(Interrupt::Timer, true)]
#[case(Interrupt::Disk, true)]
#[case(Interrupt::Serial, true)]
#[case(Interrupt::SyscallTrap, true)]
#[case(Interrupt::ArithmeticException, true)]
#[case(Interrupt::PowerOnReset, false)]
#[case(Interrupt::PageInvalid, false)]
#[case(Interrupt::ExceptionDuringInterrupt, false)]
fn test_maskability(#[case] class: Interrupt, #[case] maskable: bool) {
    assert_eq!(class.is_maskable(), maskable);
}
