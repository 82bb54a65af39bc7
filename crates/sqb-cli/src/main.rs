//! sqb entry point.
//!
//! This file is intentionally thin: it sets up tracing, loads the config,
//! and dispatches to the command handlers in `commands/`.

mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "sqb")]
#[command(about = "Square Board: derive square display state from chain logs", long_about = None)]
struct Cli {
    /// Path to the JSON config file
    #[arg(long, global = true, default_value = "config.json")]
    config: String,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process the next settled block range: fetch, reconcile, publish, checkpoint
    Run {
        /// Override the configured maximum number of blocks for this run
        #[arg(long)]
        blocks: Option<u64>,
    },

    /// Print the checkpoint block and per-square table occupancy
    Status,

    /// Probe for pending on-chain updates since the checkpoint.
    /// Exits 0 when there is nothing new, 1 when a run would find events.
    CheckUpdates,

    /// Write the default metadata and gray RGB artifact for all 10,000 squares
    InitMetadata,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let cfg = config::Config::load(&cli.config)?;

    match cli.cmd {
        Commands::Run { blocks } => commands::run::run(&cfg, blocks).await,
        Commands::Status => commands::status::status(&cfg),
        Commands::CheckUpdates => commands::check_updates::check_updates(&cfg).await,
        Commands::InitMetadata => commands::init_metadata::init_metadata(&cfg).await,
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();
}
