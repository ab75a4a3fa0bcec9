//! Scan a user's repositories and aggregate the links found in their issues

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::{Config, EmptyIssuePolicy, FailurePolicy, ScanConfig};
use crate::links::extract_links;
use crate::model::{
    IssueBuckets, IssueEntry, IssueRecord, Projects, RepositoryEntry, RepositoryRecord,
    SkippedRepositories,
};
use crate::throttle::Throttle;
use crate::{Error, Result};

/// Where repositories and issues come from
///
/// Implemented over the GitHub REST API in `issuelinks-github`; tests use
/// in-memory fakes.
#[async_trait]
pub trait IssueSource: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// List the repositories owned by `username`
    async fn list_repositories(
        &self,
        username: &str,
        per_page: u32,
    ) -> std::result::Result<Vec<RepositoryRecord>, Self::Error>;

    /// List all issues (open and closed) of `owner/repo`
    async fn list_issues(
        &self,
        owner: &str,
        repo: &str,
    ) -> std::result::Result<Vec<IssueRecord>, Self::Error>;
}

/// Progress through the repository list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    /// 1-based position of the repository being processed
    pub current: usize,
    pub total: usize,
    /// Name of the repository, if it has one
    pub repository: Option<String>,
}

/// A repository whose issues could not be fetched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryFailure {
    pub repository: String,
    pub error: String,
}

/// Everything one scan produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub projects: Projects,
    pub skipped: SkippedRepositories,
    /// Repositories whose issue listing failed (collect policy only)
    pub failures: Vec<RepositoryFailure>,
    /// Records dropped for lacking a usable name
    pub dropped: usize,
    /// The scan stopped early because it was cancelled
    pub cancelled: bool,
}

impl ScanReport {
    /// True when every repository was processed without error
    pub fn is_complete(&self) -> bool {
        !self.cancelled && self.failures.is_empty()
    }
}

type ProgressFn = Box<dyn Fn(&Progress) + Send + Sync>;

/// Drives one scan: list repositories, fetch issues, extract links, classify
pub struct Aggregator {
    username: String,
    per_page: u32,
    scan: ScanConfig,
    throttle: Throttle,
    cancel: CancellationToken,
    progress: Option<ProgressFn>,
}

impl Aggregator {
    /// Create an aggregator for `username` with default scan settings
    pub fn new(username: impl Into<String>, per_page: u32) -> Self {
        Self {
            username: username.into(),
            per_page,
            scan: ScanConfig::default(),
            throttle: Throttle::disabled(),
            cancel: CancellationToken::new(),
            progress: None,
        }
    }

    /// Create an aggregator from loaded configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let username = config.require_username()?;
        Ok(Self::new(username, config.github.effective_per_page())
            .with_scan_config(config.scan.clone())
            .with_throttle(Throttle::from_config(&config.throttle)))
    }

    pub fn with_scan_config(mut self, scan: ScanConfig) -> Self {
        self.scan = scan;
        self
    }

    pub fn with_throttle(mut self, throttle: Throttle) -> Self {
        self.throttle = throttle;
        self
    }

    /// Stop between repositories once `cancel` fires
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Call `f` before each repository is processed
    pub fn on_progress(mut self, f: impl Fn(&Progress) + Send + Sync + 'static) -> Self {
        self.progress = Some(Box::new(f));
        self
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Run the scan against `source`
    ///
    /// Fails outright only if the repository listing fails, or if an issue
    /// listing fails under [`FailurePolicy::FailFast`].
    pub async fn scan<S: IssueSource>(&self, source: &S) -> Result<ScanReport> {
        info!(username = %self.username, per_page = self.per_page, "Listing repositories");

        self.throttle.acquire().await;
        let repositories = source
            .list_repositories(&self.username, self.per_page)
            .await
            .map_err(|e| Error::Listing(e.to_string()))?;

        let total = repositories.len();
        info!(count = total, "Fetched repositories");

        let mut report = ScanReport::default();

        for (index, record) in repositories.iter().enumerate() {
            if self.cancel.is_cancelled() {
                warn!(processed = index, total, "Scan cancelled");
                report.cancelled = true;
                break;
            }

            if let Some(progress) = &self.progress {
                progress(&Progress {
                    current: index + 1,
                    total,
                    repository: record.name().map(str::to_string),
                });
            }

            let Some(name) = record.name() else {
                debug!(index, "Dropping repository without a name");
                report.dropped += 1;
                continue;
            };

            if !self.scan.include_issues {
                report
                    .projects
                    .repository
                    .push(RepositoryEntry::new(name, record, self.empty_buckets()));
                continue;
            }

            self.throttle.acquire().await;
            let issues = match source.list_issues(&self.username, name).await {
                Ok(issues) => issues,
                Err(e) => match self.scan.on_failure {
                    FailurePolicy::FailFast => {
                        return Err(Error::Source {
                            repository: name.to_string(),
                            message: e.to_string(),
                        });
                    }
                    FailurePolicy::Collect => {
                        warn!(repository = %name, error = %e, "Failed to fetch issues");
                        report.failures.push(RepositoryFailure {
                            repository: name.to_string(),
                            error: e.to_string(),
                        });
                        continue;
                    }
                },
            };

            match self.bucket_issues(&issues) {
                Some(buckets) => {
                    debug!(repository = %name, issues = buckets.len(), "Repository has issues to report");
                    report
                        .projects
                        .repository
                        .push(RepositoryEntry::new(name, record, buckets));
                }
                None => {
                    debug!(repository = %name, "Skipping repository");
                    report.skipped.skipped_repositories.push(name.to_string());
                }
            }
        }

        info!(
            repositories = report.projects.repository.len(),
            skipped = report.skipped.skipped_repositories.len(),
            failed = report.failures.len(),
            dropped = report.dropped,
            "Scan finished"
        );

        Ok(report)
    }

    fn empty_buckets(&self) -> IssueBuckets {
        match self.scan.empty_issues {
            EmptyIssuePolicy::Drop => IssueBuckets::Linked { issues: Vec::new() },
            EmptyIssuePolicy::Retain => IssueBuckets::Split {
                issues_with_links: Vec::new(),
                issues_without_links: Vec::new(),
            },
        }
    }

    /// Sort issues into buckets; `None` means the repository is skipped
    fn bucket_issues(&self, issues: &[IssueRecord]) -> Option<IssueBuckets> {
        let mut with_links = Vec::new();
        let mut without_links = Vec::new();

        for issue in issues {
            let links = extract_links(issue.body.as_deref());
            if !links.is_empty() {
                with_links.push(IssueEntry::from_record(issue, links));
            } else if self.scan.empty_issues == EmptyIssuePolicy::Retain {
                without_links.push(IssueEntry::from_record(issue, links));
            }
        }

        match self.scan.empty_issues {
            EmptyIssuePolicy::Drop if with_links.is_empty() => None,
            EmptyIssuePolicy::Drop => Some(IssueBuckets::Linked { issues: with_links }),
            EmptyIssuePolicy::Retain if issues.is_empty() => None,
            EmptyIssuePolicy::Retain => Some(IssueBuckets::Split {
                issues_with_links: with_links,
                issues_without_links: without_links,
            }),
        }
    }
}

impl std::fmt::Debug for Aggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Aggregator")
            .field("username", &self.username)
            .field("per_page", &self.per_page)
            .field("scan", &self.scan)
            .finish_non_exhaustive()
    }
}
