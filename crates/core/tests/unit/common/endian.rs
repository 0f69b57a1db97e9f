//! # Byte Order Tests

use blitz_core::common::endian::{
    from_canonical, swap_bytes, to_canonical, verify_host_byte_order, word_from_bytes,
    word_to_bytes,
};
use proptest::prelude::*;

proptest! {
    #[test]
    fn swap_is_an_involution(x: u32) {
        prop_assert_eq!(swap_bytes(swap_bytes(x)), x);
    }

    #[test]
    fn canonical_conversion_round_trips(x: u32) {
        prop_assert_eq!(from_canonical(to_canonical(x)), x);
    }

    #[test]
    fn word_bytes_are_big_endian(x: u32) {
        prop_assert_eq!(word_to_bytes(x), x.to_be_bytes());
        prop_assert_eq!(word_from_bytes(x.to_be_bytes()), x);
    }
}

#[test]
fn test_swap_reverses_bytes() {
    assert_eq!(swap_bytes(0x1234_5678), 0x7856_3412);
}

#[test]
fn test_host_byte_order_matches_build() {
    assert!(verify_host_byte_order().is_ok());
}
