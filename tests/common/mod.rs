//! Shared test utilities for integration and E2E tests.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! let fixture = TestFixture::new().with_dataset(&[("alice", 1, 1)]);
//! fixture.command().arg("reconcile").assert().success();
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};
use std::process::Command;

use tile_merge::dataset::Dataset;
use tile_merge::tile::TileRecord;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    #[allow(unused_imports)]
    pub use assert_cmd::cargo::cargo_bin_cmd;
    #[allow(unused_imports)]
    pub use assert_fs::prelude::*;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::{dataset_text, GitFixture, TestFixture};
}

/// Pretty-printed dataset text for `(username, x, y)` triples.
pub fn dataset_text(tiles: &[(&str, i64, i64)]) -> String {
    Dataset::new(
        tiles
            .iter()
            .map(|(name, x, y)| TileRecord::new(*name, *x, *y))
            .collect(),
    )
    .to_pretty_string()
    .expect("Failed to encode dataset")
}

/// A temporary directory holding a `brave-people.json` dataset.
#[allow(dead_code)]
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

#[allow(dead_code)]
impl TestFixture {
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    pub fn with_dataset(self, tiles: &[(&str, i64, i64)]) -> Self {
        self.with_file("brave-people.json", &dataset_text(tiles))
    }

    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn dataset_path(&self) -> PathBuf {
        self.path().join("brave-people.json")
    }

    /// A `tile-merge` command running in the fixture directory.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("tile-merge");
        cmd.current_dir(self.path());
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Run git in `dir`, panicking on failure, and return stdout.
#[allow(dead_code)]
pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .env("LC_ALL", "C")
        .output()
        .expect("Failed to run git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// Three repositories in one temp directory:
///
/// - `remote.git`: a bare repository standing in for the canonical upstream,
///   used as pull URL, push URL and `origin` of the workspace.
/// - `seed`: another contributor's clone, used to advance upstream.
/// - `work`: the contributor's checkout with their change on branch `pr`.
#[allow(dead_code)]
pub struct GitFixture {
    temp_dir: assert_fs::TempDir,
    pub remote: PathBuf,
    pub seed: PathBuf,
    pub work: PathBuf,
}

#[allow(dead_code)]
impl GitFixture {
    /// Create upstream `master` holding `tiles`, and a workspace cloned from it.
    pub fn new(tiles: &[(&str, i64, i64)]) -> Self {
        let temp_dir = assert_fs::TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        let remote = root.join("remote.git");
        let seed = root.join("seed");
        let work = root.join("work");

        git(root, &["init", "--bare", "--initial-branch=master", "remote.git"]);
        git(root, &["init", "--initial-branch=master", "seed"]);
        configure_identity(&seed, "Seed User", "seed@example.com");
        std::fs::write(seed.join("brave-people.json"), dataset_text(tiles)).unwrap();
        git(&seed, &["add", "."]);
        git(&seed, &["commit", "-m", "Initial tiles"]);
        git(&seed, &["push", remote.to_str().unwrap(), "master"]);

        git(root, &["clone", remote.to_str().unwrap(), "work"]);
        configure_identity(&work, "Alice Example", "alice@example.com");

        Self {
            temp_dir,
            remote,
            seed,
            work,
        }
    }

    pub fn remote_url(&self) -> String {
        self.remote.to_string_lossy().into_owned()
    }

    /// Commit `tiles` on the contributor's `pr` branch.
    pub fn contribute(&self, tiles: &[(&str, i64, i64)]) {
        git(&self.work, &["checkout", "-b", "pr"]);
        std::fs::write(self.work.join("brave-people.json"), dataset_text(tiles)).unwrap();
        git(&self.work, &["commit", "-am", "Add my tile"]);
    }

    /// Land `tiles` on upstream `master` from another clone, then refresh the
    /// workspace's view of `origin`.
    pub fn advance_upstream(&self, tiles: &[(&str, i64, i64)]) {
        std::fs::write(self.seed.join("brave-people.json"), dataset_text(tiles)).unwrap();
        git(&self.seed, &["commit", "-am", "Someone else's tile"]);
        git(&self.seed, &["push", self.remote.to_str().unwrap(), "master"]);
        git(&self.work, &["fetch", "origin"]);
    }

    /// Dataset on upstream `master`.
    pub fn upstream_dataset(&self) -> String {
        git(&self.remote, &["show", "master:brave-people.json"])
    }

    /// Message of the latest commit on upstream `master`.
    pub fn upstream_message(&self) -> String {
        git(&self.remote, &["log", "-1", "--format=%B", "master"])
    }

    /// `tile-merge merge` preconfigured for this fixture.
    pub fn merge_command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("tile-merge");
        cmd.arg("merge")
            .env_clear()
            .env("PATH", std::env::var_os("PATH").unwrap_or_default())
            .env("HOME", self.temp_dir.path())
            .env("TILE_MERGE_WORKSPACE", &self.work)
            .env("HEAD_REF", "pr")
            .env("REPO_PULL_URL", self.remote_url())
            .env("REPO_PUSH_URL", self.remote_url())
            .env("PR_TITLE", "Add my tile")
            .env("PR_NUMBER", "17")
            .env("PLAYER_GITHUB_USERNAME", "alice");
        cmd
    }
}

fn configure_identity(repo: &Path, name: &str, email: &str) {
    git(repo, &["config", "user.name", name]);
    git(repo, &["config", "user.email", email]);
    git(repo, &["config", "commit.gpgsign", "false"]);
}
