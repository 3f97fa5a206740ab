//! # Merge Workflow
//!
//! One run, start to finish:
//!
//! 1.  Register and fetch the upstream remote.
//! 2.  Find the fork point of the contributor's branch.
//! 3.  Check the commit attribution, before anything is modified.
//! 4.  Compare the dataset at the fork point with the dataset on the
//!     contributor's head to find the one tile the submitter changed.
//! 5.  Integrate the change (merge, reconcile if needed, commit).
//! 6.  Publish the integration branch.
//!
//! The first failure aborts the run; nothing is retried here.

use log::info;

use crate::change::{detect_change, ChangeRequest};
use crate::config::{Attribution, Config};
use crate::dataset::Dataset;
use crate::error::Result;
use crate::git::RepositorySynchronizer;
use crate::merge::{MergeCoordinator, MergeOutcome};
use crate::tile::TileRecord;

/// Summary of a successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub fork_point: String,
    pub tile: TileRecord,
    pub outcome: MergeOutcome,
    pub published: bool,
}

/// Run the whole merge workflow. With `push` unset the result is committed
/// locally but not published.
pub fn run(config: &Config, sync: &RepositorySynchronizer, push: bool) -> Result<Report> {
    let settings = &config.settings;

    sync.register_and_fetch_upstream(&config.pull_url)?;
    let fork_point = sync.fork_point(&settings.upstream_ref())?;
    let attribution = Attribution::from_config(config)?;

    let base = Dataset::parse(&sync.show_file_at(&fork_point, &settings.dataset_path)?)?;
    let head = Dataset::parse(&sync.show_file_at(&config.head_ref, &settings.dataset_path)?)?;
    let tile = detect_change(&base, &head, &attribution.submitter)?;
    info!(
        "@{} proposes tile ({}, {}) since {}",
        tile.username, tile.x, tile.y, fork_point
    );

    let change = ChangeRequest::new(tile, attribution);
    let coordinator = MergeCoordinator::new(sync, config);
    let outcome = coordinator.integrate(&change)?;

    if push {
        coordinator.publish()?;
    } else {
        info!("Skipping push");
    }

    Ok(Report {
        fork_point,
        tile: change.tile,
        outcome,
        published: push,
    })
}
