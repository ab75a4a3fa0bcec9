//! Issuelinks Core - link extraction and aggregation for GitHub issues
//!
//! This crate turns a user's repositories and their issues into a JSON
//! document of markdown links, independent of how the data is fetched.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod links;
pub mod model;
pub mod output;
pub mod secrets;
pub mod throttle;

pub use aggregate::{Aggregator, IssueSource, Progress, RepositoryFailure, ScanReport};
pub use config::{Config, EmptyIssuePolicy, FailurePolicy};
pub use error::{Error, Result};
pub use links::{extract_links, Link};
pub use model::{
    IssueBuckets, IssueEntry, IssueRecord, Projects, RepositoryEntry, RepositoryRecord,
    SkippedRepositories,
};
pub use output::{write_outputs, OutputPaths};
pub use secrets::{github_token, Secrets};
pub use throttle::Throttle;
