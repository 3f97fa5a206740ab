//! # Reconcile Command Implementation
//!
//! Applies the semantic reconciliation to a local dataset file without
//! touching git: the tile given on the command line replaces any tile with
//! the same username, and the command fails if another contributor already
//! owns its coordinate. Useful for resolving a conflict by hand or checking
//! a tile before opening a pull request.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use tile_merge::dataset::Dataset;
use tile_merge::tile::TileRecord;

/// Reconcile a local dataset file with one tile
#[derive(Args, Debug)]
pub struct ReconcileArgs {
    /// Dataset file to reconcile against
    #[arg(short, long, value_name = "FILE", default_value = "brave-people.json")]
    pub dataset: PathBuf,

    /// The tile as JSON, e.g. '{"username":"alice","x":1,"y":2}'
    #[arg(short, long, value_name = "JSON")]
    pub tile: String,

    /// Rewrite the dataset file instead of printing the result
    #[arg(short, long)]
    pub write: bool,
}

/// Execute the reconcile command
pub fn execute(args: ReconcileArgs) -> Result<()> {
    let tile: TileRecord = serde_json::from_str(&args.tile).context("Invalid --tile JSON")?;
    let upstream = Dataset::from_file(&args.dataset)
        .with_context(|| format!("Failed to read {}", args.dataset.display()))?;

    let merged = Dataset::reconcile(upstream, &tile)?;

    if args.write {
        merged.write_to(&args.dataset)?;
        println!(
            "Wrote {} tiles to {}",
            merged.len(),
            args.dataset.display()
        );
    } else {
        print!("{}", merged.to_pretty_string()?);
    }
    Ok(())
}
