//! # Merge Command Implementation
//!
//! Runs the whole workflow for one pull request: fetch upstream, detect the
//! changed tile, merge it into a fresh integration branch (reconciling the
//! dataset file if git cannot), commit with attribution and push.
//!
//! All inputs can be given as flags or, as is usual in CI, through
//! environment variables. Layout settings (dataset path, remote and branch
//! names) come from `.tile-merge.yaml` in the workspace when present.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use tile_merge::config::{Config, Settings};
use tile_merge::git::RepositorySynchronizer;
use tile_merge::merge::MergeOutcome;
use tile_merge::workflow;

/// Merge the contributor's change into upstream and publish it
#[derive(Args, Debug)]
pub struct MergeArgs {
    /// Repository checkout holding the contributor's change
    #[arg(long, value_name = "DIR", env = "TILE_MERGE_WORKSPACE")]
    pub workspace: Option<PathBuf>,

    /// Path to a settings file (defaults to .tile-merge.yaml in the workspace)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Reference of the contributor's change
    #[arg(long, value_name = "REF", env = "HEAD_REF")]
    pub head_ref: String,

    /// URL the upstream repository is fetched from
    #[arg(long, value_name = "URL", env = "REPO_PULL_URL")]
    pub pull_url: String,

    /// URL the merge result is pushed to
    #[arg(long, value_name = "URL", env = "REPO_PUSH_URL")]
    pub push_url: String,

    /// Pull request title
    #[arg(long, value_name = "TITLE", env = "PR_TITLE")]
    pub pr_title: Option<String>,

    /// Pull request number
    #[arg(long, value_name = "NUMBER", env = "PR_NUMBER")]
    pub pr_number: Option<String>,

    /// GitHub username of the contributor
    #[arg(long, value_name = "USER", env = "PLAYER_GITHUB_USERNAME")]
    pub submitter: Option<String>,

    /// Commit the merge locally without pushing it
    #[arg(long)]
    pub no_push: bool,
}

/// Execute the merge command
pub fn execute(args: MergeArgs) -> Result<()> {
    let workspace = match args.workspace {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };
    let settings = Settings::load(&workspace, args.config.as_deref())?;

    let config = Config {
        workspace,
        head_ref: args.head_ref,
        pull_url: args.pull_url,
        push_url: args.push_url,
        pr_title: args.pr_title,
        pr_number: args.pr_number,
        submitter: args.submitter,
        settings,
    };

    let sync = RepositorySynchronizer::new(&config.workspace, &config.settings.upstream_remote);
    let report = workflow::run(&config, &sync, !args.no_push)?;

    let how = match &report.outcome {
        MergeOutcome::Clean => "merged cleanly".to_string(),
        MergeOutcome::Reconciled { records } => {
            format!("reconciled into {} tiles", records.len())
        }
    };
    println!(
        "@{}'s tile ({}, {}) {}",
        report.tile.username, report.tile.x, report.tile.y, how
    );
    if report.published {
        println!(
            "Pushed {} to {}",
            config.settings.integration_branch, config.settings.remote_branch
        );
    } else {
        println!(
            "Committed on {}, not pushed",
            config.settings.integration_branch
        );
    }

    Ok(())
}
