//! BLITZ linker CLI.
//!
//! Links object files into an executable. The file defining `_entry` is placed
//! first regardless of its position on the command line.

use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use blitz_core::link::{LinkError, LinkInput, link};
use blitz_core::object::ObjectFile;

#[derive(Parser, Debug)]
#[command(name = "blitz-link", author, version, about = "Linker for the BLITZ machine")]
struct Cli {
    /// Object files produced by blitz-asm.
    #[arg(required = true)]
    objects: Vec<PathBuf>,

    /// Executable to write.
    #[arg(short, long, default_value = "a.out")]
    output: PathBuf,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut inputs = Vec::with_capacity(cli.objects.len());
    for path in &cli.objects {
        let name = path.display().to_string();
        match ObjectFile::read_from(path) {
            Ok(object) => inputs.push(LinkInput { name, object }),
            Err(e) => {
                eprintln!("{name}: {e}");
                process::exit(1);
            }
        }
    }

    let output = match link(inputs) {
        Ok(output) => output,
        Err(LinkError::Failed(errors)) => {
            for e in &errors {
                eprintln!("error: {e}");
            }
            eprintln!("link failed with {} error(s)", errors.len());
            process::exit(1);
        }
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    };
    for w in &output.warnings {
        eprintln!("warning: {w}");
    }
    if let Err(e) = output.executable.write_to(&cli.output) {
        eprintln!("{}: {e}", cli.output.display());
        process::exit(1);
    }
}
