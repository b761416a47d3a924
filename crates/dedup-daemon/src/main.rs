//! Message dedup daemon
//!
//! Runs one batch of messages through exact and near-duplicate filtering
//! and writes the survivors to a pgvector table.
//!
//! # Usage
//!
//! ```bash
//! dedup-daemon run --input batch.json [--backend memory] [--database-url URL]
//! dedup-daemon prepare --table messages --dimension 768
//! dedup-daemon config
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded in order (later sources override earlier):
//! 1. Built-in defaults
//! 2. Config file (~/.config/message-dedup/config.toml)
//! 3. `--config` file
//! 4. Environment variables (DEDUP_*)
//! 5. CLI flags

use anyhow::Result;
use clap::Parser;

use dedup_daemon::{prepare_table, run_batch, show_config, Cli, CliOverrides, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            input,
            backend,
            database_url,
        } => {
            let overrides = CliOverrides {
                log_level: cli.log_level,
                backend,
                database_url,
            };
            let succeeded = run_batch(cli.config.as_deref(), &overrides, &input).await?;
            if !succeeded {
                std::process::exit(1);
            }
        }
        Commands::Prepare {
            table,
            dimension,
            database_url,
        } => {
            let overrides = CliOverrides {
                log_level: cli.log_level,
                backend: None,
                database_url,
            };
            prepare_table(cli.config.as_deref(), &overrides, &table, dimension).await?;
        }
        Commands::Config => {
            show_config(cli.config.as_deref())?;
        }
    }

    Ok(())
}
