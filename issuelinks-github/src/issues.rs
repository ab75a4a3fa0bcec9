//! Issue listing and the `IssueSource` implementation

use async_trait::async_trait;
use issuelinks_core::{IssueRecord, IssueSource, RepositoryRecord};
use tracing::{debug, info};

use crate::{Error, GitHubClient, Result};

impl GitHubClient {
    /// Fetch issues of `owner/repo` in every state
    ///
    /// Single page only; the API default page size applies. Pull requests
    /// are returned by this endpoint too and are treated like issues.
    pub async fn list_repository_issues(&self, owner: &str, repo: &str) -> Result<Vec<IssueRecord>> {
        debug!(owner, repo, "Listing issues");

        let mut url = self.endpoint(&["repos", owner, repo, "issues"])?;
        url.query_pairs_mut().append_pair("state", "all");

        let issues: Vec<IssueRecord> = self.get_json(url).await?;

        info!(repo, count = issues.len(), "Fetched issues");

        Ok(issues)
    }
}

#[async_trait]
impl IssueSource for GitHubClient {
    type Error = Error;

    async fn list_repositories(
        &self,
        username: &str,
        per_page: u32,
    ) -> Result<Vec<RepositoryRecord>> {
        self.list_user_repositories(username, per_page).await
    }

    async fn list_issues(&self, owner: &str, repo: &str) -> Result<Vec<IssueRecord>> {
        self.list_repository_issues(owner, repo).await
    }
}
