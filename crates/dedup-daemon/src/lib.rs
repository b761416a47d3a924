//! Message dedup daemon library exports.
//!
//! # Modules
//!
//! - `cli`: Command-line argument parsing with clap
//! - `commands`: Command implementations (run, prepare, config)

pub mod cli;
pub mod commands;

pub use cli::{Cli, Commands};
pub use commands::{prepare_table, run_batch, show_config, CliOverrides};
