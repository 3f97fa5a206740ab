//! # Change Detection
//!
//! A contributor's branch is expected to touch exactly one tile: their own.
//! [`detect_change`] compares the dataset at the fork point with the dataset
//! on the contributor's head and extracts that tile, rejecting branches that
//! add, move or edit anybody else's record.

use std::collections::HashMap;

use crate::config::Attribution;
use crate::dataset::Dataset;
use crate::error::{Error, Result};
use crate::tile::TileRecord;

/// The single tile being proposed, with its commit attribution.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeRequest {
    pub tile: TileRecord,
    pub attribution: Attribution,
}

impl ChangeRequest {
    pub fn new(tile: TileRecord, attribution: Attribution) -> Self {
        Self { tile, attribution }
    }
}

/// Extract the one tile that differs between `base` and `head`.
///
/// The tile must belong to `submitter`, and must not share its coordinate
/// with any other record on the head.
pub fn detect_change(base: &Dataset, head: &Dataset, submitter: &str) -> Result<TileRecord> {
    let before: HashMap<&str, &TileRecord> = base
        .records()
        .iter()
        .map(|t| (t.username.as_str(), t))
        .collect();
    let after: HashMap<&str, &TileRecord> = head
        .records()
        .iter()
        .map(|t| (t.username.as_str(), t))
        .collect();

    if after.len() != head.len() {
        return Err(invalid("a username appears more than once"));
    }

    let mut changed: Vec<&TileRecord> = head
        .records()
        .iter()
        .filter(|t| before.get(t.username.as_str()).copied() != Some(*t))
        .collect();

    let tile = match changed.len() {
        0 => return Err(invalid("no tile was added or modified")),
        1 => changed.remove(0),
        n => {
            let mut names: Vec<&str> = changed.iter().map(|t| t.username.as_str()).collect();
            names.sort_unstable();
            return Err(invalid(&format!(
                "only one tile may change, found {}: {}",
                n,
                names.join(", ")
            )));
        }
    };

    if tile.username != submitter {
        return Err(invalid(&format!(
            "@{} may only change their own tile, not @{}'s",
            submitter, tile.username
        )));
    }

    let mut removed: Vec<&str> = before
        .keys()
        .filter(|name| **name != submitter && !after.contains_key(*name))
        .copied()
        .collect();
    if !removed.is_empty() {
        removed.sort_unstable();
        return Err(invalid(&format!("tiles were removed: {}", removed.join(", "))));
    }

    if let Some(occupant) = head
        .records()
        .iter()
        .find(|t| t.username != tile.username && t.occupies(tile))
    {
        return Err(Error::SemanticConflict {
            username: tile.username.clone(),
            occupant: occupant.username.clone(),
            x: tile.x,
            y: tile.y,
        });
    }

    Ok(tile.clone())
}

fn invalid(message: &str) -> Error {
    Error::InvalidChange {
        message: message.to_string(),
    }
}
