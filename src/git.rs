//! # Repository Synchronization
//!
//! The [`RepositorySynchronizer`] wraps the handful of git commands a merge
//! run needs: registering and fetching the upstream remote, reading a file
//! as it existed at any revision, finding the fork point, and the narrow set
//! of branch/merge/commit/push primitives the merge coordinator issues.
//!
//! All commands go through a [`CommandRunner`], which in production is a
//! [`Shell`] rooted at the workspace. The synchronizer holds no other state;
//! every call either succeeds on its own or fails loudly.

use std::path::Path;

use log::{debug, info, warn};

use crate::error::{Error, Result};
use crate::shell::{command_line, CommandRunner, ExecResult, Shell};

/// Git access for one workspace.
pub struct RepositorySynchronizer {
    runner: Box<dyn CommandRunner>,
    upstream_remote: String,
}

impl RepositorySynchronizer {
    /// Creates a synchronizer that runs the system `git` in `workspace`.
    pub fn new(workspace: &Path, upstream_remote: &str) -> Self {
        Self::with_runner(Box::new(Shell::new(workspace)), upstream_remote)
    }

    /// Creates a synchronizer with a custom [`CommandRunner`].
    pub fn with_runner(runner: Box<dyn CommandRunner>, upstream_remote: &str) -> Self {
        Self {
            runner,
            upstream_remote: upstream_remote.to_string(),
        }
    }

    fn git(&self, args: &[&str]) -> Result<ExecResult> {
        self.runner.run("git", args)
    }

    /// Runs git and fails with [`Error::Environment`] on a non-zero exit.
    fn git_checked(&self, args: &[&str]) -> Result<ExecResult> {
        let result = self.git(args)?;
        result.assert_success(&command_line("git", args))?;
        Ok(result)
    }

    /// Registers the upstream remote and fetches it.
    ///
    /// An already registered remote is re-pointed at `url`; any other
    /// failure to register, and any fetch failure, is fatal.
    pub fn register_and_fetch_upstream(&self, url: &str) -> Result<()> {
        let remote = self.upstream_remote.as_str();
        let added = self.git(&["remote", "add", remote, url])?;
        if !added.success() {
            if added.output().contains("already exists") {
                info!("Remote '{}' already registered, pointing it at {}", remote, url);
                self.git_checked(&["remote", "set-url", remote, url])?;
            } else {
                return Err(Error::Environment {
                    command: command_line("git", &["remote", "add", remote, url]),
                    output: added.output(),
                });
            }
        }

        info!("Fetching {}", remote);
        self.git_checked(&["fetch", remote])?;
        Ok(())
    }

    /// Content of `path` as it existed at `revision`.
    pub fn show_file_at(&self, revision: &str, path: &str) -> Result<String> {
        let spec = format!("{}:{}", revision, path);
        Ok(self.git_checked(&["show", &spec])?.stdout)
    }

    /// Common ancestor of `HEAD` and `target_branch`.
    pub fn fork_point(&self, target_branch: &str) -> Result<String> {
        let result = self.git_checked(&["merge-base", target_branch, "HEAD"])?;
        let revision = result.stdout.trim().to_string();
        debug!("Fork point with {} is {}", target_branch, revision);
        Ok(revision)
    }

    /// Creates and checks out `name` starting at `start`.
    pub fn create_branch(&self, name: &str, start: &str) -> Result<()> {
        self.git_checked(&["checkout", "-b", name, start])?;
        Ok(())
    }

    /// Merges `reference` into the current branch without committing and
    /// without fast-forwarding. The raw result is returned for
    /// classification; a non-zero exit is not an error here.
    pub fn merge_no_commit(&self, reference: &str) -> Result<ExecResult> {
        self.git(&["merge", reference, "--no-commit", "--no-ff"])
    }

    pub fn stage(&self, path: &str) -> Result<()> {
        self.git_checked(&["add", "--", path])?;
        Ok(())
    }

    pub fn commit(&self, message: &str) -> Result<()> {
        self.git_checked(&["commit", "-m", message])?;
        Ok(())
    }

    /// `Name <email>` of the latest commit on `reference`, if it can be read.
    pub fn latest_author(&self, reference: &str) -> Option<String> {
        match self.git(&["log", "-1", "--format=%an <%ae>", reference]) {
            Ok(result) if result.success() => {
                let author = result.stdout.trim();
                (!author.is_empty()).then(|| author.to_string())
            }
            Ok(result) => {
                warn!("Cannot read the author of {}: {}", reference, result.output().trim());
                None
            }
            Err(e) => {
                warn!("Cannot read the author of {}: {}", reference, e);
                None
            }
        }
    }

    /// Pushes `local_ref` to `remote_branch` on `remote_url`.
    ///
    /// A rejected push is [`Error::PublishRace`]: another job most likely
    /// updated the branch first, and the whole run has to start over.
    pub fn publish(&self, remote_url: &str, local_ref: &str, remote_branch: &str) -> Result<()> {
        let refspec = format!("{}:{}", local_ref, remote_branch);
        info!("Pushing {} to {}", refspec, remote_url);
        let result = self.git(&["push", remote_url, &refspec])?;
        if !result.success() {
            return Err(Error::PublishRace {
                remote: remote_url.to_string(),
                output: result.output(),
            });
        }
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use crate::error::ErrorKind;

    fn sync(runner: &ScriptedRunner) -> RepositorySynchronizer {
        RepositorySynchronizer::with_runner(Box::new(runner.clone()), "upstream")
    }

    #[test]
    fn test_register_and_fetch() {
        let runner = ScriptedRunner::new()
            .ok("git remote add upstream https://example.com/repo.git", "")
            .ok("git fetch upstream", "");
        sync(&runner)
            .register_and_fetch_upstream("https://example.com/repo.git")
            .unwrap();
        assert_eq!(runner.remaining(), 0);
    }

    #[test]
    fn test_register_existing_remote_is_repointed() {
        let runner = ScriptedRunner::new()
            .fail("git remote add", 3, "error: remote upstream already exists.")
            .ok("git remote set-url upstream https://example.com/repo.git", "")
            .ok("git fetch upstream", "");
        sync(&runner)
            .register_and_fetch_upstream("https://example.com/repo.git")
            .unwrap();
        assert_eq!(runner.remaining(), 0);
    }

    #[test]
    fn test_register_other_failure_is_fatal() {
        let runner = ScriptedRunner::new().fail("git remote add", 128, "fatal: not a git repository");
        let err = sync(&runner)
            .register_and_fetch_upstream("https://example.com/repo.git")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Environment);
        assert_eq!(runner.calls().len(), 1);
    }

    #[test]
    fn test_fetch_failure_is_fatal() {
        let runner = ScriptedRunner::new()
            .ok("git remote add", "")
            .fail("git fetch upstream", 128, "fatal: could not read from remote");
        let err = sync(&runner)
            .register_and_fetch_upstream("https://example.com/repo.git")
            .unwrap_err();
        match err {
            Error::Environment { command, output } => {
                assert_eq!(command, "git fetch upstream");
                assert!(output.contains("could not read"));
            }
            other => panic!("expected environment error, got {:?}", other),
        }
    }

    #[test]
    fn test_show_file_at_returns_content_verbatim() {
        let runner = ScriptedRunner::new().ok("git show origin/master:brave-people.json", "[]\n");
        let content = sync(&runner)
            .show_file_at("origin/master", "brave-people.json")
            .unwrap();
        assert_eq!(content, "[]\n");
    }

    #[test]
    fn test_show_missing_path_fails() {
        let runner = ScriptedRunner::new().fail(
            "git show",
            128,
            "fatal: path 'nope.json' does not exist in 'origin/master'",
        );
        assert!(sync(&runner).show_file_at("origin/master", "nope.json").is_err());
    }

    #[test]
    fn test_fork_point_is_trimmed() {
        let runner = ScriptedRunner::new().ok("git merge-base upstream/master HEAD", "  abc123\n");
        assert_eq!(sync(&runner).fork_point("upstream/master").unwrap(), "abc123");
    }

    #[test]
    fn test_latest_author() {
        let runner = ScriptedRunner::new()
            .ok("git log -1", "Alice <alice@example.com>\n")
            .fail("git log -1", 128, "fatal: bad revision")
            .ok("git log -1", "\n");
        let sync = sync(&runner);
        assert_eq!(
            sync.latest_author("pr-head").as_deref(),
            Some("Alice <alice@example.com>")
        );
        assert_eq!(sync.latest_author("pr-head"), None);
        assert_eq!(sync.latest_author("pr-head"), None);
    }

    #[test]
    fn test_publish_rejection_is_race() {
        let runner = ScriptedRunner::new().fail(
            "git push https://example.com/push.git origin_master:master",
            1,
            "! [rejected] origin_master -> master (fetch first)",
        );
        let err = sync(&runner)
            .publish("https://example.com/push.git", "origin_master", "master")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PublishRace);
        assert!(err.kind().is_retryable());
    }

    #[test]
    fn test_publish_success() {
        let runner = ScriptedRunner::new().ok("git push", "");
        sync(&runner)
            .publish("https://example.com/push.git", "origin_master", "master")
            .unwrap();
    }
}
