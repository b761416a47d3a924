//! CLI argument parsing for the dedup daemon.
//!
//! CLI flags override every other config source.

use clap::{Parser, Subcommand};

use dedup_types::StoreBackend;

/// Message dedup daemon
///
/// Drops exact and near-duplicate messages from a batch and stores the rest.
#[derive(Parser, Debug)]
#[command(name = "dedup-daemon")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default ~/.config/message-dedup/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Daemon commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Deduplicate one batch and print the response JSON
    Run {
        /// Batch request JSON file, or `-` for stdin
        #[arg(short, long, default_value = "-")]
        input: String,

        /// Override store backend (postgres, memory)
        #[arg(long, value_parser = parse_backend)]
        backend: Option<StoreBackend>,

        /// Override Postgres connection string
        #[arg(long)]
        database_url: Option<String>,
    },

    /// Create the pgvector extension, table and index if missing
    Prepare {
        /// Table to create
        #[arg(short, long)]
        table: String,

        /// Embedding dimension of the provider in use
        #[arg(short, long)]
        dimension: usize,

        /// Override Postgres connection string
        #[arg(long)]
        database_url: Option<String>,
    },

    /// Print the resolved configuration as TOML
    Config,
}

fn parse_backend(value: &str) -> Result<StoreBackend, String> {
    match value.to_ascii_lowercase().as_str() {
        "postgres" => Ok(StoreBackend::Postgres),
        "memory" => Ok(StoreBackend::Memory),
        other => Err(format!("unknown backend '{other}' (expected postgres or memory)")),
    }
}
