//! CLI command implementations

pub mod config;
pub mod scan;
pub mod secrets;

pub use config::ConfigArgs;
pub use scan::ScanArgs;
pub use secrets::SecretsArgs;

use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};
use issuelinks_core::config::CliOverrides;
use issuelinks_core::{Config, EmptyIssuePolicy};

/// Flags that override the config file, shared by `scan` and `config save`
#[derive(Args, Debug, Clone, Default)]
pub struct OverrideArgs {
    /// GitHub account whose repositories are scanned
    pub username: Option<String>,

    /// Repositories to request (one page; the API caps this at 100)
    #[arg(short = 'n', long)]
    pub per_page: Option<u32>,

    /// Request the largest page the API allows
    #[arg(long)]
    pub all_repos: bool,

    /// Only list repositories, without fetching issues
    #[arg(long)]
    pub no_issues: bool,

    /// What to do with issues that contain no links
    #[arg(long, value_enum)]
    pub empty_issues: Option<EmptyIssues>,

    /// Abort on the first repository whose issues cannot be fetched
    #[arg(long)]
    pub fail_fast: bool,

    /// Send requests without pacing
    #[arg(long)]
    pub no_throttle: bool,

    /// Where to write the projects document
    #[arg(long, value_name = "PATH")]
    pub projects_out: Option<PathBuf>,

    /// Where to write the skipped repositories document
    #[arg(long, value_name = "PATH")]
    pub skipped_out: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum EmptyIssues {
    /// Leave them out; repositories without linked issues are skipped
    Drop,
    /// Keep them under `issues_without_links`
    Retain,
}

impl From<EmptyIssues> for EmptyIssuePolicy {
    fn from(value: EmptyIssues) -> Self {
        match value {
            EmptyIssues::Drop => EmptyIssuePolicy::Drop,
            EmptyIssues::Retain => EmptyIssuePolicy::Retain,
        }
    }
}

impl From<OverrideArgs> for CliOverrides {
    fn from(args: OverrideArgs) -> Self {
        CliOverrides {
            username: args.username,
            per_page: args.per_page,
            all_repos: args.all_repos,
            no_issues: args.no_issues,
            empty_issues: args.empty_issues.map(Into::into),
            fail_fast: args.fail_fast,
            no_throttle: args.no_throttle,
            projects_out: args.projects_out,
            skipped_out: args.skipped_out,
        }
    }
}

/// Load configuration with env and CLI overrides applied
pub fn load_config(path: Option<&Path>, overrides: OverrideArgs) -> anyhow::Result<Config> {
    Ok(Config::load_with_overrides(path, overrides.into())?)
}
