//! Pull request domain models and repository contract.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::Result;

/// Review state of a pull request as reported by the source host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PullRequestState {
    Open,
    Closed,
}

impl PullRequestState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }

    /// Parse a source-host state string. Anything that is not `open` is
    /// treated as closed (merged PRs report `closed` upstream).
    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("open") {
            Self::Open
        } else {
            Self::Closed
        }
    }
}

/// A cached pull request row.
///
/// `(repo_name, number)` is the dedup key; `id` is the source-assigned
/// identifier and is stored but never used for conflict resolution.
/// `created_at` is the authoritative ordering key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequest {
    pub id: i64,
    pub number: i64,
    pub repo_name: String,
    pub title: String,
    pub state: PullRequestState,
    pub author_login: String,
    pub created_at: String,
    pub merged_at: Option<String>,
    pub first_review_at: Option<String>,
    pub raw_json: Option<String>,
    pub synced_at: String,
}

/// A pull request as fetched from the source, before persistence.
/// `synced_at` is assigned by the store at upsert time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPullRequest {
    pub id: i64,
    pub number: i64,
    pub repo_name: String,
    pub title: String,
    pub state: PullRequestState,
    pub author_login: String,
    pub created_at: String,
    pub merged_at: Option<String>,
    pub first_review_at: Option<String>,
    pub raw_json: Option<String>,
}

/// Repository contract implemented by the storage crate.
#[async_trait]
pub trait PullRequestRepositoryTrait: Send + Sync {
    /// All cached pull requests, ordered by `created_at` descending.
    fn list_pull_requests(&self) -> Result<Vec<PullRequest>>;

    /// Transactional batch upsert keyed by `(repo_name, number)`.
    /// Returns the number of rows written.
    async fn upsert_pull_requests(&self, batch: Vec<NewPullRequest>) -> Result<usize>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_parse_is_case_insensitive_and_defaults_closed() {
        assert_eq!(PullRequestState::parse("open"), PullRequestState::Open);
        assert_eq!(PullRequestState::parse("OPEN"), PullRequestState::Open);
        assert_eq!(PullRequestState::parse("closed"), PullRequestState::Closed);
        assert_eq!(PullRequestState::parse("merged"), PullRequestState::Closed);
    }

    #[test]
    fn state_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&PullRequestState::Open).unwrap(),
            "\"open\""
        );
    }
}
