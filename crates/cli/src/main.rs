//! BLITZ machine emulator CLI.
//!
//! This binary loads a linked executable and runs it. It performs:
//! 1. **Setup:** Loads the JSON configuration, applies command-line overrides and
//!    attaches the serial console and the optional disk image.
//! 2. **Auto mode:** Runs until the machine halts or Ctrl-C is pressed.
//! 3. **Interactive mode:** A minimal monitor reading `g`, `s`, `r` and `q` from stdin.
//!
//! Exit status is 0 on normal termination and 1 on any configuration, file or
//! host-fatal emulation error.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use blitz_core::common::endian::verify_host_byte_order;
use blitz_core::isa::disasm::disassemble;
use blitz_core::object::DiskImage;
use blitz_core::sim::loader;
use blitz_core::soc::Console;
use blitz_core::soc::devices::StdConsole;
use blitz_core::{Config, Simulator, System};

#[derive(Parser, Debug)]
#[command(
    name = "blitz-emu",
    author,
    version,
    about = "Emulator for the BLITZ 32-bit RISC machine",
    long_about = "Loads a linked executable and runs it with CPU, MMU, disk and serial emulation.\n\nExamples:\n  blitz-emu a.out\n  blitz-emu -i --disk DISK a.out\n  RUST_LOG=blitz_core=trace blitz-emu --trace a.out"
)]
struct Cli {
    /// Executable produced by blitz-link.
    executable: PathBuf,

    /// Start in the interactive monitor instead of running immediately.
    #[arg(short, long)]
    interactive: bool,

    /// JSON configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Disk image attached to the disk controller.
    #[arg(short, long)]
    disk: Option<PathBuf>,

    /// File supplying serial input instead of the terminal.
    #[arg(long)]
    input: Option<PathBuf>,

    /// File receiving serial output instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Random seed override.
    #[arg(long)]
    seed: Option<u32>,

    /// Block on serial input when `wait` finds nothing scheduled, instead of halting.
    #[arg(long)]
    wait: bool,

    /// Log every instruction at trace level.
    #[arg(long)]
    trace: bool,

    /// Stop after this many cycles.
    #[arg(long)]
    max_cycles: Option<u64>,

    /// Print statistics when the run ends.
    #[arg(long)]
    stats: bool,
}

static INTERRUPT: OnceLock<Arc<AtomicBool>> = OnceLock::new();

extern "C" fn on_sigint(_: libc::c_int) {
    if let Some(flag) = INTERRUPT.get() {
        flag.store(true, Ordering::Relaxed);
    }
}

fn install_sigint(flag: Arc<AtomicBool>) {
    let _ = INTERRUPT.set(flag);
    let handler: extern "C" fn(libc::c_int) = on_sigint;
    // SAFETY: the handler only performs an atomic store.
    unsafe {
        libc::signal(libc::SIGINT, handler as libc::sighandler_t);
    }
}

fn fatal(message: impl std::fmt::Display) -> ! {
    error!("{message}");
    eprintln!("\n[!] FATAL: {message}");
    process::exit(1);
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = verify_host_byte_order() {
        fatal(e);
    }

    let mut config = match &cli.config {
        Some(path) => Config::load(path).unwrap_or_else(|e| fatal(format!("{}: {e}", path.display()))),
        None => Config::default(),
    };
    if let Some(seed) = cli.seed {
        config.general.random_seed = seed;
    }
    config.general.wait_for_input |= cli.wait;
    config.general.trace_instructions |= cli.trace;

    let console: Box<dyn Console> = if cli.interactive && cli.input.is_none() {
        Box::new(StdConsole::output_only())
    } else {
        Box::new(
            StdConsole::with_files(cli.input.as_deref(), cli.output.as_deref())
                .unwrap_or_else(|e| fatal(format!("serial redirection: {e}"))),
        )
    };
    let disk = cli.disk.as_ref().map(|path| {
        DiskImage::open(path).unwrap_or_else(|e| fatal(format!("{}: {e}", path.display())))
    });

    let exe = loader::read_executable(&cli.executable)
        .unwrap_or_else(|e| fatal(format!("{}: {e}", cli.executable.display())));
    let system = System::new(&config, console, disk);
    let mut sim = Simulator::new(system, &config);
    if let Err(e) = sim.load_executable(&exe) {
        fatal(e);
    }
    install_sigint(sim.interrupt_flag());

    let result = if cli.interactive {
        monitor(&mut sim)
    } else {
        run(&mut sim, cli.max_cycles)
    };
    if let Err(e) = result {
        fatal(e);
    }
    if cli.stats {
        sim.cpu.stats.print();
    }
}

fn run(sim: &mut Simulator, max_cycles: Option<u64>) -> Result<(), blitz_core::common::MachineError> {
    match sim.run(max_cycles)? {
        Some(reason) => eprintln!("\n*** machine halted: {reason} (pc = {:#010x})", sim.cpu.pc),
        None => eprintln!("\n*** cycle limit reached (pc = {:#010x})", sim.cpu.pc),
    }
    Ok(())
}

fn show_next(sim: &mut Simulator) {
    let pc = sim.cpu.pc;
    let label = sim.label_at(pc).map(|l| format!("{l}: ")).unwrap_or_default();
    match sim.cpu.peek_word(pc) {
        Some(word) => println!("{pc:#010x}  {label}{}", disassemble(word, pc)),
        None => println!("{pc:#010x}  {label}<not mapped>"),
    }
}

fn monitor(sim: &mut Simulator) -> Result<(), blitz_core::common::MachineError> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        let Some(Ok(line)) = lines.next() else {
            return Ok(());
        };
        match line.trim() {
            "g" => {
                if let Some(reason) = sim.run(None)? {
                    println!("*** halted: {reason}");
                }
                show_next(sim);
            }
            "s" => {
                if let Some(reason) = sim.step()? {
                    println!("*** halted: {reason}");
                }
                show_next(sim);
            }
            "r" => sim.cpu.dump_state(),
            "q" => return Ok(()),
            "" => {}
            other => println!("unknown command '{other}' (g = go, s = step, r = registers, q = quit)"),
        }
    }
}
