//! GitHub REST client carrying its own token

use std::time::Duration;

use issuelinks_core::{secrets, Config};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info};
use url::Url;

use crate::{Error, Result};

/// Public GitHub REST endpoint
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// GitHub API client for a user's repositories and issues
#[derive(Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    base_url: Url,
}

impl GitHubClient {
    /// Create a client against `api_url` authenticating with `token`
    ///
    /// Every request carries `Authorization: token {token}` and fails
    /// after `timeout`.
    pub fn new(token: &str, api_url: &str, timeout: Duration) -> Result<Self> {
        let token = token.trim();
        if token.is_empty() {
            return Err(Error::Auth("GitHub token is empty".to_string()));
        }

        let mut auth = HeaderValue::from_str(&format!("token {}", token))
            .map_err(|_| Error::Auth("GitHub token contains invalid characters".to_string()))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("issuelinks/", env!("CARGO_PKG_VERSION"))),
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Auth(format!("Failed to create GitHub client: {}", e)))?;

        let base_url = Url::parse(api_url)?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Parse(format!("API URL cannot be a base: {}", api_url)));
        }

        info!(api_url = %base_url, timeout_secs = timeout.as_secs(), "Created GitHub client");

        Ok(Self { http, base_url })
    }

    /// Create a client from configuration, loading the token from secrets
    ///
    /// Token is loaded from (in priority order):
    /// 1. GITHUB_TOKEN environment variable
    /// 2. ~/.config/issuelinks/secrets.toml
    pub fn from_config(config: &Config) -> Result<Self> {
        let token = secrets::github_token()
            .map_err(|e| Error::Auth(e.to_string()))?
            .ok_or_else(|| {
                Error::Auth(
                    "GitHub token not found. Set GITHUB_TOKEN environment variable \
                     or add token to ~/.config/issuelinks/secrets.toml"
                        .to_string(),
                )
            })?;

        Self::new(&token, &config.github.api_url, config.github.timeout)
    }

    /// Base URL requests are resolved against
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build `{base}/{segments...}`, escaping each segment
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Parse(format!("API URL cannot be a base: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// GET `url` and decode the JSON body
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        debug!(url = %url, "GET");

        let response = self.http.get(url.clone()).send().await?;
        let response = check_status(response, &url).await?;

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes)
            .map_err(|e| Error::Parse(format!("Unexpected response from {}: {}", url, e)))
    }
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

/// Turn a non-success response into a classified error
async fn check_status(response: Response, url: &Url) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let rate_limited = status == StatusCode::TOO_MANY_REQUESTS
        || (status == StatusCode::FORBIDDEN
            && response
                .headers()
                .get("x-ratelimit-remaining")
                .and_then(|v| v.to_str().ok())
                == Some("0"));

    let path = url.path().to_string();
    if rate_limited {
        return Err(Error::RateLimited(path));
    }

    match status {
        StatusCode::UNAUTHORIZED => Err(Error::Unauthorized(path)),
        StatusCode::NOT_FOUND => Err(Error::NotFound(path)),
        _ => {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response".to_string());
            Err(Error::Status {
                status,
                url: url.to_string(),
                body,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(api_url: &str) -> GitHubClient {
        GitHubClient::new("ghp_test", api_url, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_empty_token_rejected() {
        let err = GitHubClient::new("  ", DEFAULT_API_URL, Duration::from_secs(5)).unwrap_err();
        assert!(matches!(err, Error::Auth(_)));
    }

    #[test]
    fn test_invalid_api_url() {
        let err = GitHubClient::new("t", "not a url", Duration::from_secs(5)).unwrap_err();
        assert!(matches!(err, Error::Url(_)));
    }

    #[test]
    fn test_endpoint_joins_segments() {
        let url = client(DEFAULT_API_URL)
            .endpoint(&["users", "octocat", "repos"])
            .unwrap();
        assert_eq!(url.as_str(), "https://api.github.com/users/octocat/repos");
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let url = client("http://localhost:8080/api/v3/")
            .endpoint(&["repos", "o", "r", "issues"])
            .unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/v3/repos/o/r/issues");
    }

    #[test]
    fn test_endpoint_escapes_segments() {
        let url = client(DEFAULT_API_URL)
            .endpoint(&["users", "a/b", "repos"])
            .unwrap();
        assert_eq!(url.as_str(), "https://api.github.com/users/a%2Fb/repos");
    }

    #[test]
    fn test_debug_hides_token() {
        let debug = format!("{:?}", client(DEFAULT_API_URL));
        assert!(!debug.contains("ghp_test"));
    }
}
