//! Process exit codes.
//!
//! Each failure class gets its own code so that CI can tell a lost push race
//! (rerun the job) apart from a conflict the contributor has to fix.

use crate::error::ErrorKind;

/// The run completed.
pub const SUCCESS: i32 = 0;
/// Environment failure or any unexpected error.
pub const ERROR: i32 = 1;
/// Invalid command-line usage (reported by clap).
pub const USAGE: i32 = 2;
/// Another contributor owns the coordinate.
pub const SEMANTIC_CONFLICT: i32 = 3;
/// Git failed the merge for an unrecognized reason.
pub const UNCLASSIFIED_MERGE: i32 = 4;
/// Required configuration is missing or malformed.
pub const CONFIGURATION: i32 = 5;
/// The contributor's branch is not a single tile change.
pub const INVALID_CHANGE: i32 = 6;
/// The push was rejected; rerun the job (`EX_TEMPFAIL`).
pub const PUBLISH_RACE: i32 = 75;

/// The exit code for a failure of class `kind`.
pub fn for_kind(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::Environment => ERROR,
        ErrorKind::SemanticConflict => SEMANTIC_CONFLICT,
        ErrorKind::UnclassifiedMerge => UNCLASSIFIED_MERGE,
        ErrorKind::Configuration => CONFIGURATION,
        ErrorKind::PublishRace => PUBLISH_RACE,
        ErrorKind::InvalidChange => INVALID_CHANGE,
    }
}
