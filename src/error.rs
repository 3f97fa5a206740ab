//! # Error Handling
//!
//! This module defines the centralized error handling mechanism for
//! `tile-merge`. It uses the `thiserror` library to create an `Error` enum
//! covering every way a merge attempt can be abandoned, each variant carrying
//! enough text (usually the underlying tool's output) for an operator to act
//! on it.
//!
//! ## Error Classes
//!
//! Every variant maps onto one [`ErrorKind`], which is what callers branch on:
//!
//! - **Environment**: a git operation that should always succeed did not
//!   (branch creation, fetch, commit), or upstream content could not be
//!   understood. Never retried.
//! - **SemanticConflict**: two contributors claim the same coordinate. The
//!   contributor has to sync with upstream and resubmit.
//! - **UnclassifiedMerge**: git failed the merge for a reason other than a
//!   recognized content conflict.
//! - **Configuration**: attribution fields required for the commit are
//!   missing.
//! - **PublishRace**: the push was rejected, most likely because a
//!   concurrent job updated the branch first. The whole job should be rerun.
//! - **InvalidChange**: the contributor's branch does not contain exactly one
//!   tile change.
//!
//! All failures abort the workflow immediately. Nothing is retried inside the
//! library; retry is a whole-process decision made by the caller, guided by
//! [`ErrorKind::is_retryable`].

use thiserror::Error;

/// Main error type for tile-merge operations
#[derive(Error, Debug)]
pub enum Error {
    /// A git operation that is expected to succeed failed.
    ///
    /// Includes the command line that was run and the combined tool output.
    #[error("Command `{command}` failed:\n{output}")]
    Environment { command: String, output: String },

    /// The incoming tile lands on a coordinate already owned by another
    /// contributor.
    #[error(
        "Tile ({x}, {y}) of @{username} conflicts with @{occupant}'s tile. \
         Your change conflicts with someone else's change, sync the upstream repository and resubmit."
    )]
    SemanticConflict {
        username: String,
        occupant: String,
        x: i64,
        y: i64,
    },

    /// Git reported a merge failure that is not a recognized content conflict
    /// on the dataset file.
    #[error("Merge failed, see the git output:\n{output}")]
    UnclassifiedMerge { output: String },

    /// A value required for commit attribution is absent.
    #[error("Missing required configuration: {field}")]
    Configuration { field: String },

    /// The push was rejected by the remote.
    #[error(
        "Push to {remote} failed. There might be multiple jobs running simultaneously, \
         rerun the whole job.\n{output}"
    )]
    PublishRace { remote: String, output: String },

    /// The dataset content could not be interpreted.
    #[error("Invalid dataset: {message}")]
    InvalidDataset { message: String },

    /// The contributor's branch does not describe exactly one tile change.
    #[error("Invalid change: {message}")]
    InvalidChange { message: String },

    /// An error occurred while parsing the `.tile-merge.yaml` settings file.
    #[error("Configuration parsing error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON encoding error, wrapped from `serde_json::Error`.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A regular expression error, wrapped from `regex::Error`.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

/// The failure class of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Environment,
    SemanticConflict,
    UnclassifiedMerge,
    Configuration,
    PublishRace,
    InvalidChange,
}

impl ErrorKind {
    /// Whether rerunning the whole workflow from scratch may succeed.
    pub fn is_retryable(self) -> bool {
        matches!(self, ErrorKind::PublishRace)
    }
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Environment { .. }
            | Error::InvalidDataset { .. }
            | Error::Io(_)
            | Error::Json(_)
            | Error::Regex(_) => ErrorKind::Environment,
            Error::SemanticConflict { .. } => ErrorKind::SemanticConflict,
            Error::UnclassifiedMerge { .. } => ErrorKind::UnclassifiedMerge,
            Error::Configuration { .. } | Error::ConfigParse { .. } => ErrorKind::Configuration,
            Error::PublishRace { .. } => ErrorKind::PublishRace,
            Error::InvalidChange { .. } => ErrorKind::InvalidChange,
        }
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
