use blitz_core::common::constants::NEVER;
use blitz_core::soc::scheduler::{Random, Scheduler};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

#[test]
fn test_park_miller_sequence() {
    let mut rng = Random::new(1);
    assert_eq!(rng.next_value(), 16_807);
    assert_eq!(rng.next_value(), 282_475_249);
    assert_eq!(rng.next_value(), 1_622_650_073);
}

#[test]
fn test_zero_seed_behaves_as_one() {
    assert_eq!(Random::new(0), Random::new(1));
}

#[test]
fn test_between_with_empty_range() {
    let mut rng = Random::new(5);
    assert_eq!(rng.between(7, 7), 7);
    assert_eq!(rng.between(9, 3), 9);
}

proptest! {
    #[test]
    fn test_same_seed_same_draws(seed in any::<u32>()) {
        let mut a = Random::new(seed);
        let mut b = Random::new(seed);
        for _ in 0..16 {
            prop_assert_eq!(a.next_value(), b.next_value());
        }
    }

    #[test]
    fn test_between_stays_in_range(seed in any::<u32>(), low in 0u64..1000, span in 0u64..1000) {
        let mut rng = Random::new(seed);
        let v = rng.between(low, low + span);
        prop_assert!(v >= low && v <= low + span);
    }
}

#[test]
fn test_fast_forward_with_nothing_scheduled() {
    let mut s = Scheduler::new(1);
    assert_eq!(s.next_event(), NEVER);
    assert_eq!(s.fast_forward(), None);
    assert_eq!(s.now, 0);
}

#[test]
fn test_fast_forward_stops_one_before_the_event() {
    let mut s = Scheduler::new(1);
    s.now = 10;
    s.disk = 500;
    s.timer = 100;
    assert_eq!(s.fast_forward(), Some(89));
    assert_eq!(s.now, 99);
    assert!(!s.is_due());
    s.now += 1;
    assert!(s.is_due());
}

#[test]
fn test_fast_forward_when_already_due() {
    let mut s = Scheduler::new(1);
    s.now = 50;
    s.serial_out = 50;
    assert_eq!(s.fast_forward(), Some(0));
    assert_eq!(s.now, 50);
}

#[test]
fn test_after_without_jitter() {
    let mut s = Scheduler::new(1);
    s.now = 1000;
    assert_eq!(s.after(25, 0), 1025);
    assert_eq!(s.delay(25, 0), 25);
}

#[test]
fn test_reset_rewinds_and_reseeds() {
    let mut s = Scheduler::new(9);
    let first = s.rng.clone().next_value();
    s.now = 77;
    s.timer = 80;
    s.rng.next_value();
    s.reset(9);
    assert_eq!(s.now, 0);
    assert_eq!(s.timer, NEVER);
    assert_eq!(s.rng.next_value(), first);
}

#[test]
fn test_full_range_draws_and_delays_saturate() {
    let mut rng = Random::new(1);
    assert_eq!(rng.between(0, u64::MAX), 16807);
    let mut s = Scheduler::new(1);
    assert_eq!(s.delay(u64::MAX, 10), u64::MAX);
    s.now = 5;
    assert_eq!(s.after(u64::MAX, 0), u64::MAX);
}
