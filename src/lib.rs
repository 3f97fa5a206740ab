//! # Tile Merge Library
//!
//! This library folds a single contributor's change to a shared JSON dataset
//! of "tiles" (one record per contributor, keyed by username and by board
//! coordinate) into an upstream branch, using git as the durability and
//! history layer. Many contributors submit changes concurrently; there is no
//! central lock, so two changes may race for the same coordinate.
//!
//! ## Quick Example
//!
//! ```
//! use tile_merge::dataset::Dataset;
//! use tile_merge::tile::TileRecord;
//!
//! let upstream = Dataset::new(vec![
//!     TileRecord::new("alice", 1, 1),
//!     TileRecord::new("carol", 2, 2),
//! ]);
//! let merged = Dataset::reconcile(upstream, &TileRecord::new("bob", 5, 5)).unwrap();
//! let names: Vec<_> = merged.records().iter().map(|t| t.username.as_str()).collect();
//! assert_eq!(names, ["alice", "bob", "carol"]);
//!
//! // Somebody else already owns (5, 5).
//! assert!(Dataset::reconcile(merged, &TileRecord::new("dave", 5, 5)).is_err());
//! ```
//!
//! ## Core Concepts
//!
//! - **Tiles and datasets (`tile`, `dataset`)**: the record type and the
//!   sorted, pretty-printed file that holds them, including the semantic
//!   reconciliation used when git cannot merge the file textually.
//! - **Change detection (`change`)**: finds the one tile a contributor's
//!   branch changes, relative to its fork point.
//! - **Repository access (`git`, `shell`)**: the narrow set of git commands
//!   a run issues, behind a mockable command runner.
//! - **Merge coordination (`merge`)**: the two-tier merge (textual, then
//!   semantic), the commit message and the push.
//! - **Workflow (`workflow`)**: one run from fetching upstream to publishing.
//!
//! ## Failure Model
//!
//! Every failure aborts the run. Errors are classified by
//! [`error::ErrorKind`]; only a rejected push is worth retrying, and then by
//! rerunning the whole job.

pub mod change;
pub mod config;
pub mod dataset;
pub mod error;
pub mod exit_codes;
pub mod git;
pub mod merge;
pub mod shell;
pub mod tile;
pub mod workflow;
