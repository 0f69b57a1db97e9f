use blitz_core::common::Interrupt;
use blitz_core::stats::SimStats;
use pretty_assertions::assert_eq;

#[test]
fn test_counts_start_at_zero() {
    let stats = SimStats::default();
    assert_eq!(stats.cycles, 0);
    assert!(
        Interrupt::ALL
            .iter()
            .all(|class| stats.interrupt_count(*class) == 0)
    );
}

#[test]
fn test_interrupts_counted_per_class() {
    let mut stats = SimStats::default();
    stats.record_interrupt(Interrupt::Timer);
    stats.record_interrupt(Interrupt::Timer);
    stats.record_interrupt(Interrupt::SyscallTrap);
    assert_eq!(stats.interrupt_count(Interrupt::Timer), 2);
    assert_eq!(stats.interrupt_count(Interrupt::SyscallTrap), 1);
    assert_eq!(stats.interrupt_count(Interrupt::Disk), 0);
    assert_eq!(stats.interrupts[13], 1);
}
