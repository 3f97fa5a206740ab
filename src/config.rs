//! # Configuration
//!
//! A merge run is described by one immutable [`Config`], built once by the
//! CLI and passed by reference into the synchronizer and the coordinator.
//!
//! ## Key Components
//!
//! - **`Settings`**: repository layout that rarely changes between runs (the
//!   dataset path, remote and branch names). Read from an optional
//!   `.tile-merge.yaml` file; every field has a default, so the file can be
//!   omitted entirely.
//!
//! - **`Config`**: the per-run values (workspace, head reference, URLs and
//!   attribution), usually supplied through CI environment variables, plus
//!   the `Settings`.
//!
//! - **`Attribution`**: the validated submitter, title and change number. It
//!   can only be built when all three are present, which is how a missing
//!   value is caught before anything is committed.
//!
//! ## Example
//!
//! ```yaml
//! dataset_path: data/brave-people.json
//! target_ref: origin/main
//! remote_branch: main
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default name of the optional settings file in the workspace.
pub const SETTINGS_FILE: &str = ".tile-merge.yaml";

/// Repository layout settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Path of the dataset file, relative to the workspace.
    pub dataset_path: String,
    /// Name the upstream remote is registered under.
    pub upstream_remote: String,
    /// Upstream branch the fork point is computed against.
    pub upstream_branch: String,
    /// Reference the integration branch is created from.
    pub target_ref: String,
    /// Local branch that receives the merge result.
    pub integration_branch: String,
    /// Branch on the push remote that the result is published to.
    pub remote_branch: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dataset_path: "brave-people.json".to_string(),
            upstream_remote: "upstream".to_string(),
            upstream_branch: "master".to_string(),
            target_ref: "origin/master".to_string(),
            integration_branch: "origin_master".to_string(),
            remote_branch: "master".to_string(),
        }
    }
}

impl Settings {
    /// Parse settings from YAML.
    pub fn parse(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml).map_err(|e| Error::ConfigParse {
            message: e.to_string(),
            hint: Some(
                "Known keys: dataset_path, upstream_remote, upstream_branch, \
                 target_ref, integration_branch, remote_branch"
                    .to_string(),
            ),
        })
    }

    /// Read settings from a file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| Error::ConfigParse {
            message: format!("cannot read {}: {}", path.display(), e),
            hint: None,
        })?;
        Self::parse(&content)
    }

    /// Load `explicit` if given, otherwise `.tile-merge.yaml` in `workspace`
    /// when it exists, otherwise the defaults.
    pub fn load(workspace: &Path, explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let candidate = workspace.join(SETTINGS_FILE);
                if candidate.is_file() {
                    Self::from_file(candidate)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// The upstream branch as seen through the upstream remote.
    pub fn upstream_ref(&self) -> String {
        format!("{}/{}", self.upstream_remote, self.upstream_branch)
    }
}

/// Everything one merge run needs.
#[derive(Debug, Clone)]
pub struct Config {
    pub workspace: PathBuf,
    /// Reference holding the contributor's change.
    pub head_ref: String,
    pub pull_url: String,
    pub push_url: String,
    pub pr_title: Option<String>,
    pub pr_number: Option<String>,
    pub submitter: Option<String>,
    pub settings: Settings,
}

impl Config {
    /// Absolute path of the dataset file in the workspace.
    pub fn dataset_file(&self) -> PathBuf {
        self.workspace.join(&self.settings.dataset_path)
    }
}

/// Commit attribution, present in full.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribution {
    pub submitter: String,
    pub title: String,
    pub number: String,
}

impl Attribution {
    pub fn new(
        submitter: Option<&str>,
        title: Option<&str>,
        number: Option<&str>,
    ) -> Result<Self> {
        Ok(Self {
            submitter: require("submitter", submitter)?,
            title: require("title", title)?,
            number: require("number", number)?,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.submitter.as_deref(),
            config.pr_title.as_deref(),
            config.pr_number.as_deref(),
        )
    }
}

fn require(field: &str, value: Option<&str>) -> Result<String> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(Error::Configuration {
            field: field.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.dataset_path, "brave-people.json");
        assert_eq!(settings.upstream_ref(), "upstream/master");
        assert_eq!(settings.target_ref, "origin/master");
        assert_eq!(settings.integration_branch, "origin_master");
    }

    #[test]
    fn test_parse_partial_settings() {
        let settings = Settings::parse("dataset_path: data/tiles.json\nremote_branch: main\n").unwrap();
        assert_eq!(settings.dataset_path, "data/tiles.json");
        assert_eq!(settings.remote_branch, "main");
        assert_eq!(settings.upstream_remote, "upstream");
    }

    #[test]
    fn test_parse_empty_settings() {
        assert_eq!(Settings::parse("").unwrap(), Settings::default());
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = Settings::parse("dataset: tiles.json\n").unwrap_err();
        assert!(matches!(err, Error::ConfigParse { hint: Some(_), .. }));
    }

    #[test]
    fn test_load_from_workspace() {
        let temp = TempDir::new().unwrap();
        assert_eq!(Settings::load(temp.path(), None).unwrap(), Settings::default());

        std::fs::write(temp.path().join(SETTINGS_FILE), "target_ref: origin/main\n").unwrap();
        let settings = Settings::load(temp.path(), None).unwrap();
        assert_eq!(settings.target_ref, "origin/main");
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope.yaml");
        let err = Settings::load(temp.path(), Some(missing.as_path())).unwrap_err();
        assert!(matches!(err, Error::ConfigParse { .. }));
    }

    #[test]
    fn test_attribution_requires_all_fields() {
        let ok = Attribution::new(Some("alice"), Some("Add my tile"), Some("42")).unwrap();
        assert_eq!(ok.number, "42");

        match Attribution::new(None, Some("Add my tile"), Some("42")) {
            Err(Error::Configuration { field }) => assert_eq!(field, "submitter"),
            other => panic!("expected configuration error, got {:?}", other),
        }
        match Attribution::new(Some("alice"), Some("  "), Some("42")) {
            Err(Error::Configuration { field }) => assert_eq!(field, "title"),
            other => panic!("expected configuration error, got {:?}", other),
        }
        match Attribution::new(Some("alice"), Some("Add my tile"), None) {
            Err(Error::Configuration { field }) => assert_eq!(field, "number"),
            other => panic!("expected configuration error, got {:?}", other),
        }
    }
}
