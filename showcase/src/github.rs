// Remote project source backed by the GitHub REST API.
// Lists a user's repositories, most recently updated first, and keeps the pinned ones.

use crate::config::GitHub as GitHubConfig;
use crate::metrics_defs::{GITHUB_REPOS_RETURNED, GITHUB_REQUEST_DURATION};
use crate::normalize::normalize;
use crate::pinned::PinnedRepoSet;
use crate::resolver::{ProjectSource, SourceError};
use crate::types::{ProjectRecord, SourceTag};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{StatusCode, Url};
use serde_json::Value;
use shared::histogram;
use std::time::{Duration, Instant};

const GITHUB_API_VERSION: &str = "2022-11-28";
const PER_PAGE: &str = "100";

#[derive(thiserror::Error, Debug)]
pub enum GitHubError {
    #[error("GitHub token required but not configured")]
    MissingToken,
    #[error("configured GitHub token is not a valid header value")]
    InvalidToken,
    #[error("invalid API base URL: {0}")]
    InvalidUrl(String),
    #[error("request to GitHub timed out")]
    Timeout,
    #[error("request to GitHub failed: {0}")]
    Request(reqwest::Error),
    #[error("GitHub returned HTTP {0}")]
    Status(StatusCode),
    #[error("could not decode repository list: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for GitHubError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GitHubError::Timeout
        } else if err.is_decode() {
            GitHubError::Decode(err.to_string())
        } else {
            GitHubError::Request(err)
        }
    }
}

enum Credential {
    Anonymous,
    Bearer(HeaderValue),
    // The token could not be encoded as a header; every fetch fails with InvalidToken.
    Invalid,
}

pub struct GitHubRepos {
    client: reqwest::Client,
    api_base: Url,
    username: String,
    pinned: PinnedRepoSet,
    credential: Credential,
    require_token: bool,
}

impl GitHubRepos {
    pub fn new(config: &GitHubConfig, pinned: PinnedRepoSet) -> Result<Self, GitHubError> {
        Self::with_timeout(config, pinned, Duration::from_secs(config.timeout_secs))
    }

    pub fn with_timeout(
        config: &GitHubConfig,
        pinned: PinnedRepoSet,
        timeout: Duration,
    ) -> Result<Self, GitHubError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static(GITHUB_API_VERSION),
        );
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("folio/", env!("CARGO_PKG_VERSION"))),
        );

        let credential = match config.token.as_deref().map(str::trim) {
            None | Some("") => Credential::Anonymous,
            Some(token) => match HeaderValue::from_str(&format!("Bearer {token}")) {
                Ok(mut value) => {
                    value.set_sensitive(true);
                    Credential::Bearer(value)
                }
                Err(_) => {
                    tracing::warn!("GitHub token is not a valid header value, remote source disabled");
                    Credential::Invalid
                }
            },
        };

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(GitHubError::Request)?;

        Ok(GitHubRepos {
            client,
            api_base: config.api_base.clone(),
            username: config.username.clone(),
            pinned,
            credential,
            require_token: config.require_token,
        })
    }

    fn repos_url(&self, username: &str) -> Result<Url, GitHubError> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| GitHubError::InvalidUrl(self.api_base.to_string()))?
            .pop_if_empty()
            .extend(["users", username, "repos"]);
        url.query_pairs_mut()
            .append_pair("sort", "updated")
            .append_pair("direction", "desc")
            .append_pair("per_page", PER_PAGE);
        Ok(url)
    }

    /// Fetches `username`'s repositories and keeps those named in `pinned`.
    /// An empty result means nothing matched; callers treat it like a failure.
    pub async fn fetch(
        &self,
        username: &str,
        pinned: &PinnedRepoSet,
    ) -> Result<Vec<ProjectRecord>, GitHubError> {
        let request = match &self.credential {
            Credential::Invalid => return Err(GitHubError::InvalidToken),
            Credential::Anonymous if self.require_token => return Err(GitHubError::MissingToken),
            Credential::Anonymous => self.client.get(self.repos_url(username)?),
            Credential::Bearer(value) => self
                .client
                .get(self.repos_url(username)?)
                .header(AUTHORIZATION, value.clone()),
        };

        let start = Instant::now();
        let sent = request.send().await;
        histogram!(GITHUB_REQUEST_DURATION).record(start.elapsed().as_secs_f64());
        let response = sent?;

        if !response.status().is_success() {
            return Err(GitHubError::Status(response.status()));
        }

        let repos = response.json::<Vec<Value>>().await?;
        histogram!(GITHUB_REPOS_RETURNED).record(repos.len() as f64);

        let projects: Vec<ProjectRecord> = repos
            .iter()
            .filter(|repo| {
                repo.get("name")
                    .and_then(Value::as_str)
                    .is_some_and(|name| pinned.matches(name))
            })
            .map(normalize)
            .collect();

        if projects.is_empty() {
            tracing::info!(
                username,
                returned = repos.len(),
                "no GitHub repositories matched the pinned set"
            );
        }

        Ok(projects)
    }
}

#[async_trait]
impl ProjectSource for GitHubRepos {
    fn tag(&self) -> SourceTag {
        SourceTag::Remote
    }

    async fn fetch(&self) -> Result<Vec<ProjectRecord>, SourceError> {
        GitHubRepos::fetch(self, &self.username, &self.pinned)
            .await
            .map_err(|err| SourceError::Unavailable(err.to_string()))
    }
}
