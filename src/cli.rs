//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands;

/// Tile Merge - Fold one contributor's tile into the shared dataset
#[derive(Parser, Debug)]
#[command(name = "tile-merge")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Set log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, global = true, value_name = "LEVEL", default_value = "info")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Merge the contributor's change into upstream and publish it
    Merge(commands::merge::MergeArgs),

    /// Reconcile a local dataset file with one tile
    Reconcile(commands::reconcile::ReconcileArgs),

    /// Print the fork point of HEAD against the upstream branch
    ForkPoint(commands::fork_point::ForkPointArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&self.log_level))
            .format_timestamp(None)
            .init();

        match self.command {
            Commands::Merge(args) => commands::merge::execute(args),
            Commands::Reconcile(args) => commands::reconcile::execute(args),
            Commands::ForkPoint(args) => commands::fork_point::execute(args),
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }
}
