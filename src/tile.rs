//! Tile records, one per contributor.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One contributor's entry in the shared dataset.
///
/// `username` is the primary key and `(x, y)` must be unique across the
/// dataset. Any other attributes are display data the merge never looks at;
/// they are kept verbatim in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileRecord {
    pub username: String,
    pub x: i64,
    pub y: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TileRecord {
    pub fn new(username: impl Into<String>, x: i64, y: i64) -> Self {
        Self {
            username: username.into(),
            x,
            y,
            extra: Map::new(),
        }
    }

    pub fn coordinate(&self) -> (i64, i64) {
        (self.x, self.y)
    }

    /// Whether both records sit on the same board coordinate.
    pub fn occupies(&self, other: &TileRecord) -> bool {
        self.coordinate() == other.coordinate()
    }

    /// The order records are written in: by username, then `(y, x)`.
    pub fn canonical_cmp(&self, other: &TileRecord) -> Ordering {
        self.username
            .cmp(&other.username)
            .then(self.y.cmp(&other.y))
            .then(self.x.cmp(&other.x))
    }
}
