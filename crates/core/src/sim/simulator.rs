//! Simulator: the CPU plus the host-side run loop.
//!
//! The simulator owns the machine and an interrupt flag the front end sets from
//! its Ctrl-C handler. The flag is only observed between cycles, so a host stop
//! never splits an instruction.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use super::loader;
use crate::common::error::MachineError;
use crate::config::Config;
use crate::core::Cpu;
use crate::core::cpu::HaltReason;
use crate::object::{Executable, ExecutableLabel};
use crate::soc::System;

/// Top-level simulator.
#[derive(Debug)]
pub struct Simulator {
    /// CPU architectural state and the system it drives.
    pub cpu: Cpu,
    /// Labels of the loaded executable.
    pub labels: Vec<ExecutableLabel>,
    interrupt: Arc<AtomicBool>,
}

impl Simulator {
    /// Creates a new simulator with the given system and configuration.
    pub fn new(system: System, config: &Config) -> Self {
        Self {
            cpu: Cpu::new(system, config),
            labels: Vec::new(),
            interrupt: Arc::new(AtomicBool::new(false)),
        }
    }

    /// The flag a host signal handler sets to stop the run.
    pub fn interrupt_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.interrupt)
    }

    /// Loads an executable and resets the machine.
    pub fn load_executable(&mut self, exe: &Executable) -> Result<(), MachineError> {
        self.labels = loader::load_executable(&mut self.cpu.bus.memory, exe)?;
        self.reset();
        Ok(())
    }

    /// Power-on reset; memory is kept.
    pub fn reset(&mut self) {
        self.cpu.reset();
        self.cpu.stats = Default::default();
    }

    /// Advances the machine by one cycle.
    #[inline]
    pub fn tick(&mut self) -> Result<(), MachineError> {
        self.cpu.tick()
    }

    /// Runs until the next instruction completes, a dispatch happens, or the
    /// machine halts.
    pub fn step(&mut self) -> Result<Option<HaltReason>, MachineError> {
        self.cpu.resume();
        self.cpu.tick()?;
        Ok(self.cpu.halted)
    }

    /// Runs until the machine halts or the host interrupts it.
    ///
    /// # Arguments
    ///
    /// * `limit` - Optional maximum number of cycles.
    ///
    /// # Returns
    ///
    /// The halt reason, or `None` when the cycle limit ran out first.
    pub fn run(&mut self, limit: Option<u64>) -> Result<Option<HaltReason>, MachineError> {
        self.cpu.resume();
        let mut remaining = limit;
        while self.cpu.halted.is_none() {
            if self.interrupt.swap(false, Ordering::Relaxed) {
                self.cpu.halt(HaltReason::HostInterrupt);
                break;
            }
            if let Some(n) = remaining.as_mut() {
                if *n == 0 {
                    return Ok(None);
                }
                *n -= 1;
            }
            self.cpu.tick()?;
        }
        self.cpu.bus.serial.flush()?;
        Ok(self.cpu.halted)
    }

    /// Looks up a label by value, for the monitor.
    pub fn label_at(&self, addr: u32) -> Option<&str> {
        self.labels
            .iter()
            .find(|label| label.value == addr)
            .map(|label| label.name.as_str())
    }
}
