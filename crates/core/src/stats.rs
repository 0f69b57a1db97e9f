//! Emulation statistics collection and reporting.
//!
//! This module tracks what a run did. It provides:
//! 1. **Cycles and instructions:** Total cycles, executed instructions and host speed.
//! 2. **Mode breakdown:** Cycles spent in user mode, system mode and fast-forwarded idle.
//! 3. **Interrupts:** Dispatch counts for each of the fourteen classes.

use std::time::Instant;

use crate::common::error::Interrupt;

/// Run statistics.
#[derive(Clone, Debug)]
pub struct SimStats {
    start_time: Instant,
    /// Total cycles elapsed, including idle cycles skipped by `wait`.
    pub cycles: u64,
    /// Instructions executed to completion.
    pub instructions: u64,
    /// Cycles spent in user mode.
    pub cycles_user: u64,
    /// Cycles spent in system mode.
    pub cycles_system: u64,
    /// Cycles skipped while waiting for the next event.
    pub cycles_idle: u64,
    /// Dispatch count per interrupt class, indexed by bit position.
    pub interrupts: [u64; 14],
}

impl Default for SimStats {
    fn default() -> Self {
        Self {
            start_time: Instant::now(),
            cycles: 0,
            instructions: 0,
            cycles_user: 0,
            cycles_system: 0,
            cycles_idle: 0,
            interrupts: [0; 14],
        }
    }
}

impl SimStats {
    /// Counts one dispatch of `class`.
    #[inline]
    pub fn record_interrupt(&mut self, class: Interrupt) {
        self.interrupts[class.index()] += 1;
    }

    /// Dispatch count of `class`.
    pub fn interrupt_count(&self, class: Interrupt) -> u64 {
        self.interrupts[class.index()]
    }

    /// Prints the report to stdout.
    pub fn print(&self) {
        let seconds = self.start_time.elapsed().as_secs_f64();
        let khz = if seconds > 0.0 {
            (self.cycles as f64 / seconds) / 1000.0
        } else {
            0.0
        };
        let pct = |part: u64| {
            if self.cycles == 0 {
                0.0
            } else {
                part as f64 * 100.0 / self.cycles as f64
            }
        };

        println!("\n==========================================================");
        println!("BLITZ EMULATION STATISTICS");
        println!("==========================================================");
        println!("host_seconds             {:.4} s", seconds);
        println!("sim_cycles               {}", self.cycles);
        println!("sim_freq                 {:.2} kHz", khz);
        println!("sim_insts                {}", self.instructions);
        println!("----------------------------------------------------------");
        println!("MODE BREAKDOWN");
        println!(
            "  cycles.user            {:<10} ({:.2}%)",
            self.cycles_user,
            pct(self.cycles_user)
        );
        println!(
            "  cycles.system          {:<10} ({:.2}%)",
            self.cycles_system,
            pct(self.cycles_system)
        );
        println!(
            "  cycles.idle            {:<10} ({:.2}%)",
            self.cycles_idle,
            pct(self.cycles_idle)
        );
        println!("----------------------------------------------------------");
        println!("INTERRUPTS");
        for class in Interrupt::ALL {
            let count = self.interrupt_count(class);
            if count > 0 {
                println!("  {:<26} {}", class.name(), count);
            }
        }
        println!("==========================================================");
    }
}
