//! Raw API records and the JSON documents written by a scan

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::links::Link;

/// Repository as returned by `GET /users/{username}/repos`
///
/// Only the fields the scan uses are kept. `name` stays a raw JSON value
/// so a record with a missing or non-string name can be dropped instead of
/// failing the whole listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepositoryRecord {
    #[serde(default)]
    pub name: Option<Value>,
    /// `None` when the key is absent, `Some(Value::Null)` when it is null
    #[serde(
        default,
        deserialize_with = "present_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Value>,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl RepositoryRecord {
    /// Create a record with just a name, as tests and fakes need
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(Value::String(name.into())),
            ..Default::default()
        }
    }

    /// The repository name, if present and a string
    pub fn name(&self) -> Option<&str> {
        self.name.as_ref().and_then(Value::as_str)
    }

    /// Description for the output: a placeholder when the key is missing,
    /// `None` when the API sent null
    pub fn output_description(&self) -> Option<String> {
        match &self.description {
            None => Some("No description".to_string()),
            Some(value) => value.as_str().map(str::to_string),
        }
    }
}

/// Keep an explicit JSON null as `Some(Value::Null)`; `#[serde(default)]`
/// covers the missing-key case.
fn present_value<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Issue as returned by `GET /repos/{owner}/{repo}/issues`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueRecord {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub number: Option<u64>,
    #[serde(default)]
    pub body: Option<String>,
}

impl IssueRecord {
    pub fn new(title: impl Into<String>, number: u64, body: Option<&str>) -> Self {
        Self {
            title: Some(title.into()),
            number: Some(number),
            body: body.map(str::to_string),
        }
    }

    /// `"{title} #{number}"`, with placeholders for missing parts
    pub fn display_title(&self) -> String {
        let title = self.title.as_deref().unwrap_or("No title");
        match self.number {
            Some(number) => format!("{} #{}", title, number),
            None => format!("{} #No number", title),
        }
    }

    /// First line of the body, or a placeholder when there is no body
    pub fn summary(&self) -> String {
        match self.body.as_deref() {
            Some(body) if !body.is_empty() => body.split('\n').next().unwrap_or_default().to_string(),
            _ => "No description".to_string(),
        }
    }
}

/// One issue in the output document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueEntry {
    pub title: String,
    pub description: String,
    pub links: Vec<Link>,
}

impl IssueEntry {
    /// Build the output entry for a raw issue and its extracted links
    pub fn from_record(issue: &IssueRecord, links: Vec<Link>) -> Self {
        Self {
            title: issue.display_title(),
            description: issue.summary(),
            links,
        }
    }
}

/// How a repository's issues are laid out in the output
///
/// The shape depends on the empty-issue policy used for the scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IssueBuckets {
    /// Both linked and link-less issues
    Split {
        issues_with_links: Vec<IssueEntry>,
        issues_without_links: Vec<IssueEntry>,
    },
    /// Only issues that carry links
    Linked { issues: Vec<IssueEntry> },
}

impl IssueBuckets {
    /// Total issues across buckets
    pub fn len(&self) -> usize {
        match self {
            IssueBuckets::Linked { issues } => issues.len(),
            IssueBuckets::Split {
                issues_with_links,
                issues_without_links,
            } => issues_with_links.len() + issues_without_links.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One repository in the output document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryEntry {
    pub name: String,
    pub description: Option<String>,
    pub url: String,
    pub created_at: String,
    #[serde(flatten)]
    pub issues: IssueBuckets,
}

impl RepositoryEntry {
    /// Build the output entry for a named repository
    pub fn new(name: &str, record: &RepositoryRecord, issues: IssueBuckets) -> Self {
        Self {
            name: name.to_string(),
            description: record.output_description(),
            url: record.html_url.clone().unwrap_or_else(|| "#".to_string()),
            created_at: record.created_at.clone().unwrap_or_default(),
            issues,
        }
    }
}

/// Aggregated document, written to `github_projects.json`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Projects {
    pub repository: Vec<RepositoryEntry>,
}

/// Skipped repository names, written to `skipped_repos.json`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRepositories {
    pub skipped_repositories: Vec<String>,
}
