//! # Mirror Node Runtime
//!
//! `mn-runtime replay <file.json>` ingests decoded record items and prints
//! every emitted record as one JSON line on stdout. Logs go to stderr.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use mn_runtime::{init_tracing, replay, ReplayFile, RuntimeConfig};

/// Mirror node ingestion runtime
#[derive(Parser, Debug)]
#[command(name = "mn-runtime", version)]
#[command(about = "Entity resolution and contract result reconciliation")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay decoded record items from a JSON file
    Replay {
        /// Replay file: `{ "entities": [...], "items": [...] }`
        file: PathBuf,

        /// Override `MN_WORKERS`
        #[arg(short, long)]
        workers: Option<usize>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut config = RuntimeConfig::from_env().context("Failed to load configuration")?;
    init_tracing(&config).context("Failed to initialize tracing")?;

    match args.command {
        Command::Replay { file, workers } => {
            if let Some(workers) = workers {
                config.workers = workers.max(1);
            }
            info!(file = %file.display(), workers = config.workers, "Starting replay");

            let reader = File::open(&file)
                .with_context(|| format!("Failed to open {}", file.display()))?;
            let replay_file = ReplayFile::from_reader(BufReader::new(reader))
                .with_context(|| format!("Failed to parse {}", file.display()))?;

            let stdout = io::stdout();
            let mut out = stdout.lock();
            let report = replay(&config, &replay_file, &mut out).context("Replay failed")?;
            info!(
                items = report.summary.items,
                records = report.summary.records,
                "Done"
            );
        }
    }

    Ok(())
}
