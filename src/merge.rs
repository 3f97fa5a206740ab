//! # Merge Coordination
//!
//! The [`MergeCoordinator`] folds one [`ChangeRequest`] into the upstream
//! branch and produces a single commit. It works in two tiers:
//!
//! 1.  **Textual merge**: a fresh integration branch is created from the
//!     target reference and the contributor's head is merged into it with
//!     `--no-commit --no-ff`. If git merges cleanly, its result is used as-is.
//! 2.  **Semantic reconciliation**: if git reports a content conflict on the
//!     dataset file, the file is rebuilt by replaying the contributor's tile
//!     against the dataset at the tip of the target reference (see
//!     [`Dataset::reconcile`]). A coordinate collision with another
//!     contributor aborts the run instead of guessing.
//!
//! Any other merge failure is left unclassified and aborts the run.
//!
//! The result is committed with the pull request title, number and a thank
//! you to the submitter, plus a `Co-authored-by` trailer for the author of
//! the contributor's latest commit when it can be determined.

use log::{info, warn};
use regex::Regex;

use crate::change::ChangeRequest;
use crate::config::{Attribution, Config};
use crate::dataset::Dataset;
use crate::error::{Error, Result};
use crate::git::RepositorySynchronizer;
use crate::shell::ExecResult;

/// How git's merge attempt turned out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeStatus {
    /// The merge applied without conflicts.
    Clean,
    /// Git reported content conflicts in these paths.
    ContentConflict { paths: Vec<String> },
    /// The merge failed for a reason that is not a recognized conflict.
    Unknown,
}

/// What [`MergeCoordinator::integrate`] committed.
#[derive(Debug, Clone, PartialEq)]
pub enum MergeOutcome {
    /// Git's own merge result was committed.
    Clean,
    /// The dataset file was rebuilt semantically.
    Reconciled { records: Dataset },
}

/// Line git prints for every path it could not merge textually.
const CONFLICT_MARKER: &str = r"(?m)^CONFLICT \([^)]*\): Merge conflict in (.+?)\s*$";

/// Classify the result of `git merge`.
pub fn classify_merge(result: &ExecResult) -> Result<MergeStatus> {
    if result.success() {
        return Ok(MergeStatus::Clean);
    }

    let output = result.output();
    let paths: Vec<String> = Regex::new(CONFLICT_MARKER)?
        .captures_iter(&output)
        .map(|c| c[1].to_string())
        .collect();

    if paths.is_empty() {
        Ok(MergeStatus::Unknown)
    } else {
        Ok(MergeStatus::ContentConflict { paths })
    }
}

/// Build the commit message for a merged change.
///
/// ```
/// use tile_merge::config::Attribution;
/// use tile_merge::merge::commit_message;
///
/// let attribution = Attribution::new(Some("alice"), Some("Add my tile"), Some("12")).unwrap();
/// assert_eq!(
///     commit_message(&attribution, None),
///     "Add my tile (#12)\n\nThanks to @alice's contribution!"
/// );
/// ```
pub fn commit_message(attribution: &Attribution, co_author: Option<&str>) -> String {
    let mut message = format!(
        "{} (#{})\n\nThanks to @{}'s contribution!",
        attribution.title, attribution.number, attribution.submitter
    );
    if let Some(author) = co_author {
        message.push_str("\n\nCo-authored-by: ");
        message.push_str(author);
    }
    message
}

/// Integrates one change request per run.
pub struct MergeCoordinator<'a> {
    sync: &'a RepositorySynchronizer,
    config: &'a Config,
}

impl<'a> MergeCoordinator<'a> {
    pub fn new(sync: &'a RepositorySynchronizer, config: &'a Config) -> Self {
        Self { sync, config }
    }

    /// Branch, merge, reconcile if needed, and commit.
    pub fn integrate(&self, change: &ChangeRequest) -> Result<MergeOutcome> {
        let settings = &self.config.settings;

        info!(
            "Creating {} from {}",
            settings.integration_branch, settings.target_ref
        );
        self.sync
            .create_branch(&settings.integration_branch, &settings.target_ref)?;

        let merge = self.sync.merge_no_commit(&self.config.head_ref)?;
        let outcome = match classify_merge(&merge)? {
            MergeStatus::Clean => {
                info!("{} merged cleanly", self.config.head_ref);
                MergeOutcome::Clean
            }
            MergeStatus::ContentConflict { paths }
                if paths.iter().all(|p| p == &settings.dataset_path) =>
            {
                info!(
                    "Conflict in {}, reconciling @{}'s tile",
                    settings.dataset_path, change.tile.username
                );
                MergeOutcome::Reconciled {
                    records: self.reconcile(change)?,
                }
            }
            MergeStatus::ContentConflict { .. } | MergeStatus::Unknown => {
                return Err(Error::UnclassifiedMerge {
                    output: merge.output(),
                });
            }
        };

        self.finalize(&change.attribution)?;
        Ok(outcome)
    }

    /// Rebuild the dataset file from the tip of the target reference.
    fn reconcile(&self, change: &ChangeRequest) -> Result<Dataset> {
        let settings = &self.config.settings;
        let latest = self
            .sync
            .show_file_at(&settings.target_ref, &settings.dataset_path)?;
        let dataset = Dataset::reconcile(Dataset::parse(&latest)?, &change.tile)?;

        dataset.write_to(&self.config.dataset_file())?;
        self.sync.stage(&settings.dataset_path)?;
        Ok(dataset)
    }

    fn finalize(&self, attribution: &Attribution) -> Result<()> {
        let co_author = self.sync.latest_author(&self.config.head_ref);
        if co_author.is_none() {
            warn!("Committing without a Co-authored-by trailer");
        }
        self.sync
            .commit(&commit_message(attribution, co_author.as_deref()))
    }

    /// Push the integration branch to the configured remote branch.
    pub fn publish(&self) -> Result<()> {
        let settings = &self.config.settings;
        self.sync.publish(
            &self.config.push_url,
            &settings.integration_branch,
            &settings.remote_branch,
        )
    }
}
