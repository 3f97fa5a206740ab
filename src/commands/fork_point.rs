//! Fork point command implementation

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use tile_merge::config::Settings;
use tile_merge::git::RepositorySynchronizer;

/// Print the fork point of HEAD against the upstream branch
#[derive(Args, Debug)]
pub struct ForkPointArgs {
    /// Branch to compare against (defaults to the configured upstream branch)
    #[arg(value_name = "TARGET")]
    pub target: Option<String>,

    /// Repository checkout
    #[arg(long, value_name = "DIR", env = "TILE_MERGE_WORKSPACE")]
    pub workspace: Option<PathBuf>,

    /// Path to a settings file (defaults to .tile-merge.yaml in the workspace)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Execute the fork-point command
pub fn execute(args: ForkPointArgs) -> Result<()> {
    let workspace = match args.workspace {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };
    let settings = Settings::load(&workspace, args.config.as_deref())?;
    let target = args.target.unwrap_or_else(|| settings.upstream_ref());

    let sync = RepositorySynchronizer::new(&workspace, &settings.upstream_remote);
    println!("{}", sync.fork_point(&target)?);
    Ok(())
}
