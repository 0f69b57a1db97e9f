use blitz_core::Simulator;
use blitz_core::asm::assemble;
use blitz_core::config::Config;
use blitz_core::core::Cpu;
use blitz_core::core::arch::mode::Mode;
use blitz_core::isa::encode::{Operands, encode};
use blitz_core::isa::opcodes::{self, Format};
use blitz_core::link::{LinkInput, link};
use blitz_core::object::{DiskImage, Executable};
use blitz_core::soc::System;
use blitz_core::soc::devices::BufferConsole;
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

/// Installs a test-friendly subscriber once per process; `RUST_LOG` selects levels.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Default configuration with the timer disabled, so only the test schedules events.
pub fn quiet_config() -> Config {
    let mut config = Config::default();
    config.timing.timer_quantum = 0;
    config
}

pub struct TestContext {
    pub sim: Simulator,
    pub output: Arc<Mutex<Vec<u8>>>,
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TestContext {
    pub fn new() -> Self {
        Self::build(quiet_config(), b"", None)
    }

    /// A context whose serial line delivers `input`.
    pub fn with_input(input: &[u8]) -> Self {
        Self::build(quiet_config(), input, None)
    }

    pub fn build(config: Config, input: &[u8], disk: Option<DiskImage>) -> Self {
        init_tracing();
        let console = BufferConsole::new(input);
        let output = console.output_handle();
        let system = System::new(&config, Box::new(console), disk);
        Self {
            sim: Simulator::new(system, &config),
            output,
        }
    }

    /// Convenience accessor for the CPU.
    pub fn cpu(&self) -> &Cpu {
        &self.sim.cpu
    }

    /// Mutable convenience accessor for the CPU.
    pub fn cpu_mut(&mut self) -> &mut Cpu {
        &mut self.sim.cpu
    }

    /// Places instruction words at `addr`, sets the PC there and drops the pending
    /// reset, so the next tick executes the first instruction.
    pub fn load_program(mut self, addr: u32, words: &[u32]) -> Self {
        for (i, word) in words.iter().enumerate() {
            self.write_word(addr + 4 * i as u32, *word);
        }
        self.sim.cpu.pc = addr;
        self.sim.cpu.interrupts.clear_all();
        self
    }

    /// Writes a physical memory word.
    pub fn write_word(&mut self, addr: u32, value: u32) {
        self.sim.cpu.bus.memory.write_word(addr, value).unwrap();
    }

    /// Reads a physical memory word.
    pub fn read_word(&self, addr: u32) -> u32 {
        self.sim.cpu.bus.memory.read_word(addr).unwrap()
    }

    /// Sets an integer register in the active bank.
    pub fn set_reg(&mut self, reg: usize, val: u32) {
        self.sim.cpu.set_reg(reg, val);
    }

    /// Reads an integer register from the active bank.
    pub fn get_reg(&self, reg: usize) -> u32 {
        self.sim.cpu.reg(reg)
    }

    /// Sets the system-bank stack pointer.
    pub fn set_system_sp(&mut self, sp: u32) {
        self.sim.cpu.regs.write(Mode::System, 15, sp);
    }

    /// Runs up to `cycles` cycles, stopping early on a halt.
    pub fn run(&mut self, cycles: u64) {
        for _ in 0..cycles {
            self.sim.tick().unwrap();
            if self.sim.cpu.halted.is_some() {
                break;
            }
        }
    }

    /// Serial output captured so far.
    pub fn output_string(&self) -> String {
        String::from_utf8_lossy(&self.output.lock().unwrap()).into_owned()
    }
}

/// Encodes one instruction from the opcode table.
pub fn inst(mnemonic: &str, format: Format, ops: Operands) -> u32 {
    let info = opcodes::find(mnemonic, format)
        .unwrap_or_else(|| panic!("no {format:?} form of '{mnemonic}'"));
    encode(info, ops)
}

/// Format A: no operands.
pub fn op_a(mnemonic: &str) -> u32 {
    inst(mnemonic, Format::A, Operands::default())
}

/// Format B: `m rc`.
pub fn op_b(mnemonic: &str, rc: usize) -> u32 {
    inst(mnemonic, Format::B, Operands { rc, ..Operands::default() })
}

/// Format D in assembler order: `m ra, rb, rc`.
pub fn op_d(mnemonic: &str, ra: usize, rb: usize, rc: usize) -> u32 {
    inst(mnemonic, Format::D, Operands { rc, ra, rb, imm: 0 })
}

/// Format E in assembler order: `m ra, imm, rc`.
pub fn op_e(mnemonic: &str, ra: usize, imm: i32, rc: usize) -> u32 {
    inst(mnemonic, Format::E, Operands { rc, ra, rb: 0, imm })
}

/// Format C: `m ra, rc`.
pub fn op_c(mnemonic: &str, ra: usize, rc: usize) -> u32 {
    inst(mnemonic, Format::C, Operands { rc, ra, rb: 0, imm: 0 })
}

/// Format F: PC-relative displacement.
pub fn op_f(mnemonic: &str, displacement: i32) -> u32 {
    inst(mnemonic, Format::F, Operands { imm: displacement, ..Operands::default() })
}

/// Format G: `m imm, rc`.
pub fn op_g(mnemonic: &str, imm: i32, rc: usize) -> u32 {
    inst(mnemonic, Format::G, Operands { rc, imm, ..Operands::default() })
}

/// Assembles each `(name, source)` pair and links the objects.
pub fn build_executable(sources: &[(&str, &str)]) -> Executable {
    let inputs = sources
        .iter()
        .map(|(name, source)| LinkInput {
            name: (*name).to_string(),
            object: assemble(source, name)
                .unwrap_or_else(|e| panic!("{name}: {:?}", e.errors))
                .object,
        })
        .collect();
    link(inputs).unwrap().executable
}
