//! # FPU Tests

use blitz_core::core::units::fpu::Fpu;

#[test]
fn test_to_int_truncates_toward_zero() {
    assert_eq!(Fpu::to_int(-2.9), Some(-2));
    assert_eq!(Fpu::to_int(2.9), Some(2));
}

#[test]
fn test_to_int_rejects_nan_and_out_of_range() {
    assert_eq!(Fpu::to_int(f64::NAN), None);
    assert_eq!(Fpu::to_int(3.0e9), None);
    assert_eq!(Fpu::to_int(-3.0e9), None);
    assert_eq!(Fpu::to_int(f64::from(i32::MIN)), Some(i32::MIN));
}

#[test]
fn test_compare_sets_flags() {
    let lt = Fpu::compare(1.0, 2.0);
    assert!(lt.n && !lt.z && !lt.v);
    let eq = Fpu::compare(2.0, 2.0);
    assert!(eq.z && !eq.n);
    let unordered = Fpu::compare(f64::NAN, 2.0);
    assert!(unordered.v && !unordered.z && !unordered.n);
}
