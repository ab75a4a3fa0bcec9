//! Repository listing

use issuelinks_core::RepositoryRecord;
use tracing::{debug, info};

use crate::{GitHubClient, Result};

impl GitHubClient {
    /// Fetch one page of repositories owned by `username`
    ///
    /// `per_page` is sent as-is; the API clamps values above its maximum.
    pub async fn list_user_repositories(
        &self,
        username: &str,
        per_page: u32,
    ) -> Result<Vec<RepositoryRecord>> {
        debug!(username, per_page, "Listing repositories");

        let mut url = self.endpoint(&["users", username, "repos"])?;
        url.query_pairs_mut()
            .append_pair("per_page", &per_page.to_string());

        let repositories: Vec<RepositoryRecord> = self.get_json(url).await?;

        info!(username, count = repositories.len(), "Fetched repositories");

        Ok(repositories)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use std::time::Duration;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> GitHubClient {
        GitHubClient::new("ghp_test", &server.uri(), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_lists_repositories_with_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/octocat/repos"))
            .and(query_param("per_page", "30"))
            .and(header("authorization", "token ghp_test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {
                    "name": "hello-world",
                    "description": "My first repo",
                    "html_url": "https://github.com/octocat/hello-world",
                    "created_at": "2011-01-26T19:01:12Z",
                    "stargazers_count": 80
                },
                { "description": null }
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let repos = client(&server)
            .list_user_repositories("octocat", 30)
            .await
            .unwrap();

        assert_eq!(repos.len(), 2);
        assert_eq!(repos[0].name(), Some("hello-world"));
        assert_eq!(repos[0].description.as_ref().and_then(serde_json::Value::as_str), Some("My first repo"));
        assert_eq!(
            repos[0].html_url.as_deref(),
            Some("https://github.com/octocat/hello-world")
        );
        assert!(repos[1].name().is_none());
    }

    #[tokio::test]
    async fn test_per_page_is_not_clamped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/octocat/repos"))
            .and(query_param("per_page", "150"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let repos = client(&server)
            .list_user_repositories("octocat", 150)
            .await
            .unwrap();
        assert!(repos.is_empty());
    }

    #[tokio::test]
    async fn test_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(serde_json::json!({"message": "Bad credentials"})),
            )
            .mount(&server)
            .await;

        let err = client(&server)
            .list_user_repositories("octocat", 30)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403).insert_header("x-ratelimit-remaining", "0"))
            .mount(&server)
            .await;

        let err = client(&server)
            .list_user_repositories("octocat", 30)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::RateLimited(_)));
    }

    #[tokio::test]
    async fn test_forbidden_without_rate_limit_is_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403).set_body_string("nope"))
            .mount(&server)
            .await;

        let err = client(&server)
            .list_user_repositories("octocat", 30)
            .await
            .unwrap_err();
        match err {
            Error::Status { status, body, .. } => {
                assert_eq!(status.as_u16(), 403);
                assert_eq!(body, "nope");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"not\": \"a list\"}"))
            .mount(&server)
            .await;

        let err = client(&server)
            .list_user_repositories("octocat", 30)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }
}
