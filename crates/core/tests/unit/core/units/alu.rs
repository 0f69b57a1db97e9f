//! # ALU Tests
//!
//! Wrapping arithmetic, the N/V/Z condition codes and division edge cases.

use blitz_core::core::units::alu::{Alu, AluOp};
use proptest::prelude::*;
use rstest::rstest;

#[test]
fn test_add_overflow_wraps_to_min() {
    let r = Alu::execute(AluOp::Add, i32::MAX, 1).unwrap();
    assert_eq!(r.value, i32::MIN);
    assert!(r.flags.v);
    assert!(r.flags.n);
    assert!(!r.flags.z);
}

#[test]
fn test_div_min_by_minus_one_overflows_without_trapping() {
    let r = Alu::execute(AluOp::Div, i32::MIN, -1).unwrap();
    assert_eq!(r.value, i32::MIN);
    assert!(r.flags.v);
}

#[rstest]
#[case(AluOp::Div)]
#[case(AluOp::Rem)]
fn test_zero_divisor_has_no_result(#[case] op: AluOp) {
    assert!(Alu::execute(op, 42, 0).is_none());
}

#[rstest]
#[case(AluOp::Add, 40, 2, 42)]
#[case(AluOp::Sub, 5, 5, 0)]
#[case(AluOp::Mul, -6, 7, -42)]
#[case(AluOp::Div, -7, 2, -3)]
#[case(AluOp::Rem, -7, 2, -1)]
#[case(AluOp::Sll, 1, 33, 2)]
#[case(AluOp::Sra, -8, 1, -4)]
#[case(AluOp::Srl, -8, 28, 0xF)]
#[case(AluOp::Or, 0b1100, 0b1010, 0b1110)]
#[case(AluOp::And, 0b1100, 0b1010, 0b1000)]
#[case(AluOp::Andn, 0b1111, 0b0101, 0b1010)]
#[case(AluOp::Xor, 0b1100, 0b1010, 0b0110)]
fn test_results(#[case] op: AluOp, #[case] a: i32, #[case] b: i32, #[case] expected: i32) {
    let r = Alu::execute(op, a, b).unwrap();
    assert_eq!(r.value, expected);
    assert_eq!(r.flags.z, expected == 0);
}

#[test]
fn test_mul_overflow_uses_exact_product() {
    assert!(Alu::execute(AluOp::Mul, 0x10000, 0x10000).unwrap().flags.v);
    assert!(!Alu::execute(AluOp::Mul, -46341, 46340).unwrap().flags.v);
}

proptest! {
    #[test]
    fn add_matches_wrapping_add(a: i32, b: i32) {
        let r = Alu::execute(AluOp::Add, a, b).unwrap();
        prop_assert_eq!(r.value, a.wrapping_add(b));
        prop_assert_eq!(r.flags.v, a.checked_add(b).is_none());
        prop_assert_eq!(r.flags.n, r.value < 0);
        prop_assert_eq!(r.flags.z, r.value == 0);
    }

    #[test]
    fn logic_never_sets_overflow(a: i32, b: i32) {
        for op in [AluOp::Or, AluOp::And, AluOp::Andn, AluOp::Xor] {
            prop_assert!(!Alu::execute(op, a, b).unwrap().flags.v);
        }
    }
}
