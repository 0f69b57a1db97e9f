//! BLITZ assembler CLI.
//!
//! Assembles one source file into a relocatable object file. Errors and warnings
//! are printed with their source lines; any error suppresses the output file and
//! exits with status 1.

use std::fs;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use blitz_core::asm::assemble;

#[derive(Parser, Debug)]
#[command(name = "blitz-asm", author, version, about = "Assembler for the BLITZ machine")]
struct Cli {
    /// Source file (conventionally `.s`).
    source: PathBuf,

    /// Object file to write; defaults to the source name with a `.o` extension.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let name = cli.source.display().to_string();
    let source = fs::read_to_string(&cli.source).unwrap_or_else(|e| {
        eprintln!("{name}: {e}");
        process::exit(1);
    });

    let assembly = match assemble(&source, &name) {
        Ok(assembly) => assembly,
        Err(err) => {
            for w in &err.warnings {
                eprintln!("warning: {w}");
            }
            for e in &err.errors {
                eprintln!("error: {e}");
            }
            eprintln!("{err}");
            process::exit(1);
        }
    };
    for w in &assembly.warnings {
        eprintln!("warning: {w}");
    }

    let output = cli
        .output
        .unwrap_or_else(|| cli.source.with_extension("o"));
    if let Err(e) = assembly.object.write_to(&output) {
        eprintln!("{}: {e}", output.display());
        process::exit(1);
    }
}
