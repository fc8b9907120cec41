//! `mokaccino-dump`: opens a built index read-only and prints every
//! recreated query as `qid: dnf`, one per line.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use mokaccino::prelude::*;

#[derive(Parser)]
#[command(name = "mokaccino-dump", about = "Inspect a built mokaccino index")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Recreate and print every query in an index.
    Dump {
        /// Path to the index: a directory for rocks, a file for
        /// sqlite/memory (memory only if it was built via
        /// `MemoryStore::with_file`, which is what flushes that file).
        index_path: PathBuf,
        #[arg(long, value_enum, default_value_t = Backend::Memory)]
        backend: Backend,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Backend {
    Memory,
    #[cfg(feature = "rocks")]
    Rocks,
    #[cfg(feature = "sqlite")]
    Sqlite,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let Command::Dump { index_path, backend } = cli.command;
    let queries = match backend {
        Backend::Memory => recreate(&MemoryStore::open(&index_path)?)?,
        #[cfg(feature = "rocks")]
        Backend::Rocks => recreate(&RocksStore::open_read_only(&index_path)?)?,
        #[cfg(feature = "sqlite")]
        Backend::Sqlite => recreate(&SqliteStore::open_read_only(&index_path)?)?,
    };

    for query in queries {
        let dnf: Vec<String> = query
            .dnf
            .iter()
            .map(|clause| format!("({})", clause.join(" OR ")))
            .collect();
        println!("{}: {}", query.qid, dnf.join(" AND "));
    }
    Ok(())
}
