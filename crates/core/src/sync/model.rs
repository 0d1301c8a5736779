//! Sync domain models and the contracts between orchestrator, storage and
//! source clients.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::commits::Commit;
use crate::errors::Result;
use crate::prs::NewPullRequest;
use crate::sprints::NewSprint;

/// External data sources tracked by the sync subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncSource {
    Github,
    Jira,
}

impl SyncSource {
    /// Combined-sync order: GitHub first, then Jira.
    pub const ALL: [SyncSource; 2] = [SyncSource::Github, SyncSource::Jira];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Github => "github",
            Self::Jira => "jira",
        }
    }

    /// Parse a caller-supplied source name. Returns `None` for anything
    /// that is not a known source; the facade maps that to a client error.
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "github" => Some(Self::Github),
            "jira" => Some(Self::Jira),
            _ => None,
        }
    }
}

impl std::fmt::Display for SyncSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted outcome of the most recent sync attempt for one source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    /// No sync has ever run for this source.
    Never,
    /// Queued but not yet started.
    Pending,
    InProgress,
    Success,
    /// A combined run where at least one source failed.
    Partial,
    Error,
}

impl SyncStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Never => "never",
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Success => "success",
            Self::Partial => "partial",
            Self::Error => "error",
        }
    }
}

/// One row per source; read by the staleness predicate and exposed
/// verbatim to the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncMetadata {
    pub source: SyncSource,
    pub last_sync_at: String,
    pub status: SyncStatus,
    pub error_msg: Option<String>,
    pub duration_ms: Option<i64>,
}

/// A repository to pull from, `owner/repo` on the source host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoSpec {
    pub owner: String,
    pub repo: String,
}

impl RepoSpec {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    /// Parse an `owner/repo` string.
    pub fn parse(value: &str) -> Option<Self> {
        let (owner, repo) = value.trim().split_once('/')?;
        if owner.is_empty() || repo.is_empty() {
            return None;
        }
        Some(Self::new(owner, repo))
    }

    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

/// Orchestrator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncSettings {
    /// Repositories to pull PRs and commits from.
    pub repos: Vec<RepoSpec>,
    /// Issue-tracker project key for board discovery.
    pub project_key: String,
    /// Cached data older than this many hours is considered stale.
    pub stale_hours: i64,
    /// Date splitting dashboard metrics into before/after cohorts,
    /// `YYYY-MM-DD`.
    pub pivot_date: chrono::NaiveDate,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            repos: Vec::new(),
            project_key: "AAP".to_string(),
            stale_hours: super::DEFAULT_STALE_HOURS,
            pivot_date: chrono::NaiveDate::from_ymd_opt(2025, 7, 1).expect("valid date"),
        }
    }
}

/// Storage contract for sync metadata rows.
#[async_trait]
pub trait SyncStateRepositoryTrait: Send + Sync {
    fn get_sync_metadata(&self, source: SyncSource) -> Result<Option<SyncMetadata>>;

    fn list_sync_metadata(&self) -> Result<Vec<SyncMetadata>>;

    /// Upsert by source, always refreshing `last_sync_at` to now.
    async fn set_sync_status(
        &self,
        source: SyncSource,
        status: SyncStatus,
        error_msg: Option<String>,
        duration_ms: Option<i64>,
    ) -> Result<()>;
}

/// Storage contract for derived-analytics blobs (member stats).
#[async_trait]
pub trait DerivedCacheRepositoryTrait: Send + Sync {
    fn get_derived(&self, cache_key: &str) -> Result<Option<serde_json::Value>>;

    async fn put_derived(&self, cache_key: &str, payload: serde_json::Value) -> Result<()>;
}

/// Pull-request source client contract (GitHub).
#[async_trait]
pub trait PullRequestSource: Send + Sync {
    /// All pull requests of one repository, fully paginated and tagged
    /// with `owner/repo`. Transport failure aborts and propagates.
    async fn fetch_pull_requests(&self, repo: &RepoSpec) -> Result<Vec<NewPullRequest>>;

    /// Earliest review submission time for one PR. Fetch failures are
    /// tolerated and yield `None`.
    async fn fetch_first_review_at(&self, repo: &RepoSpec, number: i64) -> Option<String>;

    /// Commits of one repository, page-capped and best effort: a page
    /// failure stops the loop and the partial result is returned.
    async fn fetch_commits(&self, repo: &RepoSpec) -> Result<Vec<Commit>>;
}

/// Sprint source client contract (Jira).
#[async_trait]
pub trait SprintSource: Send + Sync {
    /// Sprints of the project's first board with per-sprint point metrics
    /// already reduced from the issue set.
    async fn fetch_sprints_with_issues(&self, project_key: &str) -> Result<Vec<NewSprint>>;
}

/// Status of one step in a streamed sync run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStepStatus {
    Syncing,
    Done,
    Error,
}

/// Progress event emitted after each sync step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncProgressPayload {
    pub step: String,
    pub status: SyncStepStatus,
    pub message: String,
}

/// One failed source in a combined run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncSourceError {
    pub source: SyncSource,
    pub message: String,
}

/// Aggregate outcome of a combined (multi-source) sync run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRunSummary {
    pub success: bool,
    pub status: SyncStatus,
    pub errors: Vec<SyncSourceError>,
    pub duration_ms: i64,
}

/// Push channel for sync progress. Implementations must not block; the
/// orchestrator calls these inline between steps.
pub trait SyncProgressReporter: Send + Sync {
    fn report_sync_start(&self);

    fn report_progress(&self, payload: SyncProgressPayload);

    fn report_sync_complete(&self, summary: &SyncRunSummary);
}

/// Reporter that drops everything; used when no listener is attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgressReporter;

impl SyncProgressReporter for NoopProgressReporter {
    fn report_sync_start(&self) {}

    fn report_progress(&self, _payload: SyncProgressPayload) {}

    fn report_sync_complete(&self, _summary: &SyncRunSummary) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_parse_accepts_known_sources_only() {
        assert_eq!(SyncSource::parse("github"), Some(SyncSource::Github));
        assert_eq!(SyncSource::parse("JIRA"), Some(SyncSource::Jira));
        assert_eq!(SyncSource::parse("gitlab"), None);
        assert_eq!(SyncSource::parse(""), None);
    }

    #[test]
    fn source_serialization_matches_api_contract() {
        assert_eq!(serde_json::to_string(&SyncSource::Github).unwrap(), "\"github\"");
        assert_eq!(
            serde_json::to_string(&SyncStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
    }

    #[test]
    fn repo_spec_parse_requires_owner_and_repo() {
        assert_eq!(
            RepoSpec::parse("acme/widgets"),
            Some(RepoSpec::new("acme", "widgets"))
        );
        assert_eq!(RepoSpec::parse("acme"), None);
        assert_eq!(RepoSpec::parse("/widgets"), None);
        assert_eq!(RepoSpec::parse("acme/"), None);
    }
}
