//! Configuration management for issuelinks
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (ISSUELINKS_*)
//! 3. Config file (~/.config/issuelinks/config.toml)
//! 4. Default values
//!
//! The GitHub token is deliberately not part of this file; see
//! [`crate::Secrets`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{Error, Result};

/// Maximum `per_page` the GitHub API honours
pub const MAX_PER_PAGE: u32 = 100;

/// What to do with issues that contain no links
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptyIssuePolicy {
    /// Omit them; repositories without linked issues are skipped
    #[default]
    Drop,
    /// Keep them in a separate `issues_without_links` bucket
    Retain,
}

/// What to do when fetching one repository's issues fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Record the failure and continue with the next repository
    #[default]
    Collect,
    /// Abort the whole scan
    FailFast,
}

/// GitHub-related configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// Account whose repositories are scanned
    pub username: Option<String>,

    /// Page size for the repository listing
    pub per_page: u32,

    /// Request the largest page the API allows
    pub all_repos: bool,

    /// REST API base URL
    pub api_url: String,

    /// Timeout for each HTTP request
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            username: None,
            per_page: 30,
            all_repos: false,
            api_url: "https://api.github.com".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl GitHubConfig {
    /// Page size actually sent to the API
    ///
    /// Values above the API cap are passed through unchanged; the server
    /// clamps them.
    pub fn effective_per_page(&self) -> u32 {
        if self.all_repos {
            MAX_PER_PAGE
        } else {
            self.per_page
        }
    }
}

/// Scan behaviour
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Fetch issues for each repository
    pub include_issues: bool,

    /// Handling of issues without links
    pub empty_issues: EmptyIssuePolicy,

    /// Handling of per-repository fetch failures
    pub on_failure: FailurePolicy,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            include_issues: true,
            empty_issues: EmptyIssuePolicy::Drop,
            on_failure: FailurePolicy::Collect,
        }
    }
}

/// Outbound request throttle
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ThrottleConfig {
    pub enabled: bool,

    /// Requests admitted without waiting
    pub burst: u32,

    /// Time to refill a full burst
    #[serde(with = "humantime_serde")]
    pub interval: Duration,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            burst: 50,
            interval: Duration::from_secs(1),
        }
    }
}

/// Output file locations
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    pub projects: PathBuf,
    pub skipped: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            projects: PathBuf::from("github_projects.json"),
            skipped: PathBuf::from("skipped_repos.json"),
        }
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub github: GitHubConfig,
    pub scan: ScanConfig,
    pub throttle: ThrottleConfig,
    pub output: OutputConfig,
}

/// Values given on the command line; `None` leaves the lower layer alone
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub username: Option<String>,
    pub per_page: Option<u32>,
    pub all_repos: bool,
    pub no_issues: bool,
    pub empty_issues: Option<EmptyIssuePolicy>,
    pub fail_fast: bool,
    pub no_throttle: bool,
    pub projects_out: Option<PathBuf>,
    pub skipped_out: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the default config file location
    ///
    /// Returns default config if file doesn't exist
    pub fn load() -> Result<Self> {
        match Self::default_config_path() {
            Some(path) => Self::load_or_default(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load `path`, or the defaults when there is no file there yet
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            debug!(path = %path.display(), "No config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "Loading config file");
        let contents = std::fs::read_to_string(path).map_err(Error::Io)?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Write this configuration to `path`, creating parent directories
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(Error::Io)?;
            }
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents).map_err(Error::Io)?;

        info!(path = %path.display(), "Saved configuration");
        Ok(())
    }

    /// Get the default config file path
    ///
    /// Returns `~/.config/issuelinks/config.toml` on Unix
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("issuelinks").join("config.toml"))
    }

    /// Apply environment variable overrides
    ///
    /// Supported variables:
    /// - ISSUELINKS_USERNAME: Account to scan
    /// - ISSUELINKS_PER_PAGE: Repository page size
    /// - ISSUELINKS_API_URL: REST API base URL
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(username) = lookup("ISSUELINKS_USERNAME") {
            self.github.username = Some(username);
        }

        if let Some(per_page) = lookup("ISSUELINKS_PER_PAGE") {
            self.github.per_page = per_page.trim().parse().map_err(|_| {
                Error::Config(format!("ISSUELINKS_PER_PAGE is not a number: {}", per_page))
            })?;
        }

        if let Some(api_url) = lookup("ISSUELINKS_API_URL") {
            self.github.api_url = api_url;
        }

        Ok(self)
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(mut self, cli: CliOverrides) -> Self {
        if let Some(username) = cli.username {
            self.github.username = Some(username);
        }

        if let Some(per_page) = cli.per_page {
            self.github.per_page = per_page;
        }

        if cli.all_repos {
            self.github.all_repos = true;
        }

        if cli.no_issues {
            self.scan.include_issues = false;
        }

        if let Some(policy) = cli.empty_issues {
            self.scan.empty_issues = policy;
        }

        if cli.fail_fast {
            self.scan.on_failure = FailurePolicy::FailFast;
        }

        if cli.no_throttle {
            self.throttle.enabled = false;
        }

        if let Some(path) = cli.projects_out {
            self.output.projects = path;
        }

        if let Some(path) = cli.skipped_out {
            self.output.skipped = path;
        }

        self
    }

    /// Load configuration with all overrides applied
    ///
    /// Priority: CLI > env > config file > defaults
    pub fn load_with_overrides(path: Option<&Path>, cli: CliOverrides) -> Result<Self> {
        let base = match path {
            Some(path) => Self::load_from_file(path)?,
            None => Self::load()?,
        };

        Ok(base.with_env_overrides()?.with_cli_overrides(cli))
    }

    /// Username to scan, or an error naming how to set one
    pub fn require_username(&self) -> Result<&str> {
        match self.github.username.as_deref() {
            Some(name) if !name.trim().is_empty() => Ok(name),
            _ => Err(Error::Config(
                "No username configured. Pass one to `scan`, set ISSUELINKS_USERNAME, \
                 or add github.username to the config file"
                    .to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.github.username.is_none());
        assert_eq!(config.github.per_page, 30);
        assert_eq!(config.github.timeout, Duration::from_secs(30));
        assert!(config.scan.include_issues);
        assert_eq!(config.scan.empty_issues, EmptyIssuePolicy::Drop);
        assert_eq!(config.scan.on_failure, FailurePolicy::Collect);
        assert_eq!(config.throttle.burst, 50);
        assert_eq!(config.output.projects, PathBuf::from("github_projects.json"));
        assert_eq!(config.output.skipped, PathBuf::from("skipped_repos.json"));
    }

    #[test]
    fn test_all_repos_forces_max_page() {
        let mut github = GitHubConfig {
            per_page: 10,
            ..Default::default()
        };
        assert_eq!(github.effective_per_page(), 10);

        github.all_repos = true;
        assert_eq!(github.effective_per_page(), MAX_PER_PAGE);
    }

    #[test]
    fn test_per_page_not_clamped_locally() {
        let github = GitHubConfig {
            per_page: 150,
            ..Default::default()
        };
        assert_eq!(github.effective_per_page(), 150);
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
[github]
username = "octocat"
per_page = 100
timeout = "10s"

[scan]
include_issues = false
empty_issues = "retain"
on_failure = "fail-fast"

[throttle]
burst = 5
interval = "500ms"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.github.username.as_deref(), Some("octocat"));
        assert_eq!(config.github.per_page, 100);
        assert_eq!(config.github.timeout, Duration::from_secs(10));
        assert!(!config.scan.include_issues);
        assert_eq!(config.scan.empty_issues, EmptyIssuePolicy::Retain);
        assert_eq!(config.scan.on_failure, FailurePolicy::FailFast);
        assert_eq!(config.throttle.burst, 5);
        assert_eq!(config.throttle.interval, Duration::from_millis(500));
        // Untouched sections keep defaults
        assert_eq!(config.github.api_url, "https://api.github.com");
        assert_eq!(config.output.skipped, PathBuf::from("skipped_repos.json"));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("ISSUELINKS_USERNAME", "from-env"),
            ("ISSUELINKS_PER_PAGE", " 42 "),
            ("ISSUELINKS_API_URL", "http://localhost:1234"),
        ]);
        let config = Config::default()
            .with_overrides_from(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.github.username.as_deref(), Some("from-env"));
        assert_eq!(config.github.per_page, 42);
        assert_eq!(config.github.api_url, "http://localhost:1234");
    }

    #[test]
    fn test_env_per_page_must_be_numeric() {
        let result = Config::default().with_overrides_from(|key| {
            (key == "ISSUELINKS_PER_PAGE").then(|| "lots".to_string())
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_overrides() {
        let config = Config::default().with_cli_overrides(CliOverrides {
            username: Some("cli-user".to_string()),
            per_page: Some(5),
            no_issues: true,
            empty_issues: Some(EmptyIssuePolicy::Retain),
            fail_fast: true,
            no_throttle: true,
            projects_out: Some(PathBuf::from("out/p.json")),
            ..Default::default()
        });

        assert_eq!(config.github.username.as_deref(), Some("cli-user"));
        assert_eq!(config.github.per_page, 5);
        assert!(!config.github.all_repos);
        assert!(!config.scan.include_issues);
        assert_eq!(config.scan.empty_issues, EmptyIssuePolicy::Retain);
        assert_eq!(config.scan.on_failure, FailurePolicy::FailFast);
        assert!(!config.throttle.enabled);
        assert_eq!(config.output.projects, PathBuf::from("out/p.json"));
        assert_eq!(config.output.skipped, PathBuf::from("skipped_repos.json"));
    }

    #[test]
    fn test_require_username() {
        let mut config = Config::default();
        assert!(config.require_username().is_err());

        config.github.username = Some("  ".to_string());
        assert!(config.require_username().is_err());

        config.github.username = Some("octocat".to_string());
        assert_eq!(config.require_username().unwrap(), "octocat");
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.github.username = Some("octocat".to_string());
        config.scan.empty_issues = EmptyIssuePolicy::Retain;
        config.save_to_file(&path).unwrap();

        let loaded = Config::load_from_file(&path).unwrap();
        assert_eq!(loaded.github.username.as_deref(), Some("octocat"));
        assert_eq!(loaded.scan.empty_issues, EmptyIssuePolicy::Retain);
        assert_eq!(loaded.throttle.interval, Duration::from_secs(1));
    }

    #[test]
    fn test_load_or_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let missing = Config::load_or_default(&path).unwrap();
        assert!(missing.github.username.is_none());
        assert!(Config::load_from_file(&path).is_err());

        std::fs::write(&path, "[github]\nusername = \"octocat\"\n").unwrap();
        let present = Config::load_or_default(&path).unwrap();
        assert_eq!(present.github.username.as_deref(), Some("octocat"));
    }
}
