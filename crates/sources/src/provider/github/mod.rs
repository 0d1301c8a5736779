//! GitHub source provider.
//!
//! Pull requests are fetched with simple page-count pagination (page size
//! 100, stop on a short page) and propagate any transport failure. The
//! commit fetcher is deliberately softer: pages are capped and a failed or
//! slow page ends the loop with a partial result, so one flaky repo cannot
//! sink a whole sync.

use async_trait::async_trait;
use chrono::DateTime;
use log::{debug, warn};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use devpulse_core::commits::Commit;
use devpulse_core::prs::{NewPullRequest, PullRequestState};
use devpulse_core::sync::{PullRequestSource, RepoSpec};

use crate::errors::SourceError;

const PROVIDER_ID: &str = "GITHUB";
const DEFAULT_BASE_URL: &str = "https://api.github.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Page size for both PR and commit pagination.
const PAGE_SIZE: usize = 100;

/// Commit fetch cap: 50 pages (5000 commits) per repository.
const MAX_COMMIT_PAGES: usize = 50;

/// Per-page budget for commit fetches; a slow page ends the loop early.
const COMMIT_PAGE_TIMEOUT: Duration = Duration::from_secs(10);

/// A pull request as returned by the list endpoint. The raw value is kept
/// alongside for the forward-compatible snapshot column.
#[derive(Debug, Deserialize)]
struct PrItem {
    id: i64,
    number: i64,
    title: String,
    state: String,
    user: Option<UserRef>,
    created_at: String,
    merged_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserRef {
    login: String,
}

#[derive(Debug, Deserialize)]
struct ReviewItem {
    submitted_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CommitItem {
    sha: String,
    commit: CommitInfo,
    author: Option<UserRef>,
    html_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CommitInfo {
    message: String,
    author: Option<CommitAuthor>,
}

#[derive(Debug, Deserialize)]
struct CommitAuthor {
    email: Option<String>,
    date: Option<String>,
}

/// GitHub REST client for pull requests, reviews and commits.
pub struct GithubProvider {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl GithubProvider {
    pub fn new(token: Option<String>) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, token)
    }

    pub fn with_base_url(base_url: &str, token: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("devpulse"));
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github.v3+json"),
        );
        if let Some(token) = &self.token {
            if let Ok(value) = HeaderValue::from_str(&format!("token {token}")) {
                headers.insert(AUTHORIZATION, value);
            }
        }
        headers
    }

    /// GET a JSON array, failing on any non-2xx status.
    async fn get_page(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<serde_json::Value>, SourceError> {
        let url = format!("{}/{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .headers(self.headers())
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::provider(
                PROVIDER_ID,
                format!("HTTP {status} for {path}"),
            ));
        }

        Ok(response.json().await?)
    }

    fn pr_from_value(repo: &RepoSpec, value: &serde_json::Value) -> Option<NewPullRequest> {
        let item: PrItem = match serde_json::from_value(value.clone()) {
            Ok(item) => item,
            Err(err) => {
                warn!("skipping malformed pull request payload: {err}");
                return None;
            }
        };

        Some(NewPullRequest {
            id: item.id,
            number: item.number,
            repo_name: repo.full_name(),
            title: item.title,
            state: PullRequestState::parse(&item.state),
            author_login: item.user.map(|user| user.login).unwrap_or_default(),
            created_at: item.created_at,
            merged_at: item.merged_at,
            first_review_at: None,
            raw_json: Some(value.to_string()),
        })
    }

    fn commit_from_value(repo: &RepoSpec, value: &serde_json::Value) -> Option<Commit> {
        let item: CommitItem = match serde_json::from_value(value.clone()) {
            Ok(item) => item,
            Err(err) => {
                warn!("skipping malformed commit payload: {err}");
                return None;
            }
        };

        let author = item.commit.author;
        // Commits without an author date cannot be bucketed.
        let authored_at = author.as_ref().and_then(|a| a.date.clone())?;

        Some(Commit {
            sha: item.sha,
            repo_name: repo.full_name(),
            author_login: item.author.map(|user| user.login),
            author_email: author.and_then(|a| a.email),
            message: item.commit.message,
            html_url: item.html_url,
            authored_at,
        })
    }
}

#[async_trait]
impl PullRequestSource for GithubProvider {
    async fn fetch_pull_requests(
        &self,
        repo: &RepoSpec,
    ) -> devpulse_core::Result<Vec<NewPullRequest>> {
        let path = format!("repos/{}/{}/pulls", repo.owner, repo.repo);
        let mut prs = Vec::new();
        let mut page = 1usize;

        loop {
            let values = self
                .get_page(
                    &path,
                    &[
                        ("state", "all".to_string()),
                        ("per_page", PAGE_SIZE.to_string()),
                        ("page", page.to_string()),
                    ],
                )
                .await
                .map_err(devpulse_core::Error::from)?;

            if values.is_empty() {
                break;
            }
            let short_page = values.len() < PAGE_SIZE;
            prs.extend(values.iter().filter_map(|value| Self::pr_from_value(repo, value)));
            if short_page {
                break;
            }
            page += 1;
        }

        debug!("fetched {} pull requests from {}", prs.len(), repo.full_name());
        Ok(prs)
    }

    async fn fetch_first_review_at(&self, repo: &RepoSpec, number: i64) -> Option<String> {
        let path = format!("repos/{}/{}/pulls/{}/reviews", repo.owner, repo.repo, number);
        // Review fetches are tolerated to fail; a PR simply keeps no review
        // timestamp until a later sync succeeds.
        let values = match self.get_page(&path, &[]).await {
            Ok(values) => values,
            Err(err) => {
                debug!(
                    "review fetch failed for {}#{number}: {err}",
                    repo.full_name()
                );
                return None;
            }
        };

        values
            .into_iter()
            .filter_map(|value| {
                serde_json::from_value::<ReviewItem>(value)
                    .ok()
                    .and_then(|review| review.submitted_at)
            })
            .filter_map(|submitted_at| {
                DateTime::parse_from_rfc3339(&submitted_at)
                    .ok()
                    .map(|parsed| (parsed, submitted_at))
            })
            .min_by_key(|(parsed, _)| *parsed)
            .map(|(_, submitted_at)| submitted_at)
    }

    async fn fetch_commits(&self, repo: &RepoSpec) -> devpulse_core::Result<Vec<Commit>> {
        let path = format!("repos/{}/{}/commits", repo.owner, repo.repo);
        let mut commits = Vec::new();

        for page in 1..=MAX_COMMIT_PAGES {
            let query = [
                ("per_page", PAGE_SIZE.to_string()),
                ("page", page.to_string()),
            ];
            let fetch = self.get_page(&path, &query);

            let values = match tokio::time::timeout(COMMIT_PAGE_TIMEOUT, fetch).await {
                Ok(Ok(values)) => values,
                Ok(Err(err)) => {
                    warn!(
                        "commit page {page} failed for {}, keeping {} commits: {err}",
                        repo.full_name(),
                        commits.len()
                    );
                    break;
                }
                Err(_) => {
                    warn!(
                        "commit page {page} timed out for {}, keeping {} commits",
                        repo.full_name(),
                        commits.len()
                    );
                    break;
                }
            };

            if values.is_empty() {
                break;
            }
            let short_page = values.len() < PAGE_SIZE;
            commits.extend(
                values
                    .iter()
                    .filter_map(|value| Self::commit_from_value(repo, value)),
            );
            if short_page {
                break;
            }
        }

        debug!("fetched {} commits from {}", commits.len(), repo.full_name());
        Ok(commits)
    }
}
