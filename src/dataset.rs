//! # Tile Dataset
//!
//! The dataset file is a JSON array of [`TileRecord`]s. It is always written
//! sorted by [`TileRecord::canonical_cmp`] and pretty-printed, so repeated
//! merges produce textually stable output and small diffs.
//!
//! [`Dataset::reconcile`] is the semantic merge used when git cannot merge
//! the file textually: the incoming record is replayed against the freshest
//! upstream snapshot, refusing to proceed when another contributor already
//! owns the coordinate.

use std::collections::{HashMap, HashSet};
use std::io::Write;
use std::path::Path;

use log::debug;
use tempfile::NamedTempFile;

use crate::error::{Error, Result};
use crate::tile::TileRecord;

/// An in-memory copy of the dataset file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    records: Vec<TileRecord>,
}

impl Dataset {
    pub fn new(records: Vec<TileRecord>) -> Self {
        Self { records }
    }

    /// Parse the dataset file content.
    pub fn parse(text: &str) -> Result<Self> {
        let records: Vec<TileRecord> =
            serde_json::from_str(text).map_err(|e| Error::InvalidDataset {
                message: format!("cannot decode tile list: {}", e),
            })?;
        Ok(Self { records })
    }

    pub fn records(&self) -> &[TileRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn find(&self, username: &str) -> Option<&TileRecord> {
        self.records.iter().find(|t| t.username == username)
    }

    /// Sort in place by [`TileRecord::canonical_cmp`].
    pub fn sort(&mut self) {
        self.records.sort_by(TileRecord::canonical_cmp);
    }

    /// The on-disk encoding: sorted, pretty-printed, newline-terminated.
    pub fn to_pretty_string(&self) -> Result<String> {
        let mut sorted = self.clone();
        sorted.sort();
        let mut text = serde_json::to_string_pretty(&sorted.records)?;
        text.push('\n');
        Ok(text)
    }

    /// Read and parse a dataset file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::parse(&std::fs::read_to_string(path)?)
    }

    /// Replace the file at `path` with [`Self::to_pretty_string`]. The new
    /// content is written to a temporary file next to it and renamed into
    /// place, so the file is never left half written.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let text = self.to_pretty_string()?;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut file = NamedTempFile::new_in(dir)?;
        file.write_all(text.as_bytes())?;
        file.persist(path).map_err(|e| e.error)?;
        Ok(())
    }

    /// Replay `incoming` on top of `upstream`.
    ///
    /// Any upstream record with the same username is replaced. If another
    /// contributor's record sits on the same coordinate the merge is refused
    /// with [`Error::SemanticConflict`]. Upstream records that already break
    /// uniqueness among themselves are reported as [`Error::InvalidDataset`].
    pub fn reconcile(upstream: Dataset, incoming: &TileRecord) -> Result<Dataset> {
        let mut records: Vec<TileRecord> = upstream
            .records
            .into_iter()
            .filter(|t| t.username != incoming.username)
            .collect();

        if let Some(occupant) = records.iter().find(|t| t.occupies(incoming)) {
            return Err(Error::SemanticConflict {
                username: incoming.username.clone(),
                occupant: occupant.username.clone(),
                x: incoming.x,
                y: incoming.y,
            });
        }

        check_unique(&records)?;

        debug!(
            "Placing @{} at ({}, {}) among {} upstream tiles",
            incoming.username,
            incoming.x,
            incoming.y,
            records.len()
        );
        records.push(incoming.clone());
        let mut merged = Dataset { records };
        merged.sort();
        Ok(merged)
    }
}

fn check_unique(records: &[TileRecord]) -> Result<()> {
    let mut usernames: HashSet<&str> = HashSet::with_capacity(records.len());
    let mut coordinates: HashMap<(i64, i64), &str> = HashMap::with_capacity(records.len());

    for tile in records {
        if !usernames.insert(tile.username.as_str()) {
            return Err(Error::InvalidDataset {
                message: format!("@{} appears more than once", tile.username),
            });
        }
        if let Some(owner) = coordinates.insert(tile.coordinate(), tile.username.as_str()) {
            return Err(Error::InvalidDataset {
                message: format!(
                    "@{} and @{} share tile ({}, {})",
                    owner, tile.username, tile.x, tile.y
                ),
            });
        }
    }
    Ok(())
}
