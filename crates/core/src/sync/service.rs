//! Sync orchestrator.
//!
//! One service instance owns the source clients, the repositories and the
//! per-source in-flight guards. Each per-source routine runs the full
//! fetch → normalize → upsert → status pipeline, converting every failure
//! into a terminal status row; nothing on the sync path escapes to crash
//! the process.

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Duration, Utc};
use log::{error, info, warn};

use crate::analytics::members::{self, gmt7_today};
use crate::commits::Commit;
use crate::errors::Result;
use crate::prs::PullRequestRepositoryTrait;
use crate::sprints::SprintRepositoryTrait;

use super::{
    DerivedCacheRepositoryTrait, PullRequestSource, SprintSource, SyncGuards, SyncProgressPayload,
    SyncProgressReporter, SyncRunSummary, SyncSettings, SyncSource, SyncSourceError,
    SyncStateRepositoryTrait, SyncStatus, SyncStepStatus, MEMBER_STATS_CACHE_KEY,
};

pub struct SyncService {
    settings: SyncSettings,
    github: Arc<dyn PullRequestSource>,
    jira: Arc<dyn SprintSource>,
    pull_requests: Arc<dyn PullRequestRepositoryTrait>,
    sprints: Arc<dyn SprintRepositoryTrait>,
    sync_state: Arc<dyn SyncStateRepositoryTrait>,
    derived: Arc<dyn DerivedCacheRepositoryTrait>,
    reporter: Arc<dyn SyncProgressReporter>,
    guards: SyncGuards,
}

impl SyncService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        settings: SyncSettings,
        github: Arc<dyn PullRequestSource>,
        jira: Arc<dyn SprintSource>,
        pull_requests: Arc<dyn PullRequestRepositoryTrait>,
        sprints: Arc<dyn SprintRepositoryTrait>,
        sync_state: Arc<dyn SyncStateRepositoryTrait>,
        derived: Arc<dyn DerivedCacheRepositoryTrait>,
        reporter: Arc<dyn SyncProgressReporter>,
    ) -> Self {
        Self {
            settings,
            github,
            jira,
            pull_requests,
            sprints,
            sync_state,
            derived,
            reporter,
            guards: SyncGuards::new(),
        }
    }

    pub fn settings(&self) -> &SyncSettings {
        &self.settings
    }

    pub fn is_syncing(&self, source: SyncSource) -> bool {
        self.guards.is_syncing(source)
    }

    pub fn syncing_map(&self) -> BTreeMap<SyncSource, bool> {
        self.guards.syncing_map()
    }

    /// Whether a source's cache is older than the configured window.
    /// Never fails: a missing or unreadable metadata row is maximally
    /// stale.
    pub fn is_stale(&self, source: SyncSource) -> bool {
        let metadata = match self.sync_state.get_sync_metadata(source) {
            Ok(Some(metadata)) => metadata,
            Ok(None) => return true,
            Err(err) => {
                warn!("{source} staleness check failed, treating as stale: {err}");
                return true;
            }
        };

        match DateTime::parse_from_rfc3339(&metadata.last_sync_at) {
            Ok(last_sync) => {
                Utc::now().signed_duration_since(last_sync)
                    > Duration::hours(self.settings.stale_hours)
            }
            Err(_) => true,
        }
    }

    pub async fn sync_source(&self, source: SyncSource) -> Result<()> {
        match source {
            SyncSource::Github => self.sync_github().await,
            SyncSource::Jira => self.sync_jira().await,
        }
    }

    /// Sync pull requests, commits and derived member stats from GitHub.
    /// A call while a GitHub sync is in flight is a logged no-op.
    pub async fn sync_github(&self) -> Result<()> {
        let Some(_permit) = self.guards.try_acquire(SyncSource::Github) else {
            info!("github sync already in progress, skipping");
            return Ok(());
        };

        let started = Instant::now();
        let outcome = self.run_github_sync().await;
        self.finish(SyncSource::Github, outcome, started).await
    }

    /// Sync sprints from the issue tracker. Same guard semantics.
    pub async fn sync_jira(&self) -> Result<()> {
        let Some(_permit) = self.guards.try_acquire(SyncSource::Jira) else {
            info!("jira sync already in progress, skipping");
            return Ok(());
        };

        let started = Instant::now();
        let outcome = self.run_jira_sync().await;
        self.finish(SyncSource::Jira, outcome, started).await
    }

    /// Combined run: GitHub then Jira, each failure caught independently so
    /// one source never blocks the other. Emits a progress event per step
    /// and a final aggregate through the reporter.
    pub async fn sync_all(&self) -> SyncRunSummary {
        let started = Instant::now();
        self.reporter.report_sync_start();

        let mut errors = Vec::new();
        for source in SyncSource::ALL {
            self.reporter.report_progress(SyncProgressPayload {
                step: source.as_str().to_string(),
                status: SyncStepStatus::Syncing,
                message: format!("Syncing {source} data"),
            });

            match self.sync_source(source).await {
                Ok(()) => self.reporter.report_progress(SyncProgressPayload {
                    step: source.as_str().to_string(),
                    status: SyncStepStatus::Done,
                    message: format!("{source} sync finished"),
                }),
                Err(err) => {
                    let message = err.to_string();
                    self.reporter.report_progress(SyncProgressPayload {
                        step: source.as_str().to_string(),
                        status: SyncStepStatus::Error,
                        message: message.clone(),
                    });
                    errors.push(SyncSourceError { source, message });
                }
            }
        }

        let summary = SyncRunSummary {
            success: errors.is_empty(),
            status: if errors.is_empty() {
                SyncStatus::Success
            } else {
                SyncStatus::Partial
            },
            errors,
            duration_ms: started.elapsed().as_millis() as i64,
        };
        self.reporter.report_sync_complete(&summary);
        summary
    }

    /// Fire-and-forget sync from a stale-detecting read path. Failures are
    /// logged, never surfaced to the triggering read.
    pub fn trigger_background(self: &Arc<Self>, source: Option<SyncSource>) {
        match source {
            Some(source) => {
                let service = Arc::clone(self);
                tokio::spawn(async move {
                    if let Err(err) = service.sync_source(source).await {
                        error!("background {source} sync failed: {err}");
                    }
                });
            }
            None => {
                let service = Arc::clone(self);
                tokio::spawn(async move {
                    service.sync_all().await;
                });
            }
        }
    }

    /// Record the terminal status for one source's attempt, preserving the
    /// original error for the caller.
    async fn finish(&self, source: SyncSource, outcome: Result<usize>, started: Instant) -> Result<()> {
        let duration_ms = started.elapsed().as_millis() as i64;
        match outcome {
            Ok(count) => {
                self.sync_state
                    .set_sync_status(source, SyncStatus::Success, None, Some(duration_ms))
                    .await?;
                info!("{source} sync completed: {count} records in {duration_ms}ms");
                Ok(())
            }
            Err(err) => {
                let message = err.to_string();
                if let Err(status_err) = self
                    .sync_state
                    .set_sync_status(source, SyncStatus::Error, Some(message.clone()), Some(duration_ms))
                    .await
                {
                    error!("failed to record {source} sync error: {status_err}");
                }
                error!("{source} sync error: {message}");
                Err(err)
            }
        }
    }

    async fn run_github_sync(&self) -> Result<usize> {
        self.sync_state
            .set_sync_status(SyncSource::Github, SyncStatus::InProgress, None, None)
            .await?;
        info!("starting github sync");

        // Stored review times, so reviews are only fetched for PRs that are
        // new or still missing one (lazy fill).
        let existing = self.pull_requests.list_pull_requests()?;
        let known_reviews: HashMap<(String, i64), String> = existing
            .into_iter()
            .filter_map(|pr| {
                pr.first_review_at
                    .map(|at| ((pr.repo_name, pr.number), at))
            })
            .collect();

        let mut batch = Vec::new();
        let mut commits: Vec<Commit> = Vec::new();

        for repo in &self.settings.repos {
            let mut prs = self.github.fetch_pull_requests(repo).await?;
            for pr in &mut prs {
                let key = (pr.repo_name.clone(), pr.number);
                pr.first_review_at = match known_reviews.get(&key) {
                    Some(at) => Some(at.clone()),
                    None => self.github.fetch_first_review_at(repo, pr.number).await,
                };
            }
            batch.extend(prs);

            // Best effort: the commit fetcher already degrades to a partial
            // page set on failure.
            commits.extend(self.github.fetch_commits(repo).await?);
        }

        let count = batch.len();
        if !batch.is_empty() {
            self.pull_requests.upsert_pull_requests(batch).await?;
        }

        self.refresh_member_stats(&commits).await?;

        Ok(count)
    }

    /// Recompute the member-stats blob wholesale from the fresh corpus.
    async fn refresh_member_stats(&self, commits: &[Commit]) -> Result<()> {
        let prs = self.pull_requests.list_pull_requests()?;
        let stats = members::compute_member_stats(
            commits,
            &prs,
            self.settings.pivot_date,
            gmt7_today(),
        );
        let payload = serde_json::to_value(&stats)?;
        self.derived
            .put_derived(MEMBER_STATS_CACHE_KEY, payload)
            .await?;
        Ok(())
    }

    async fn run_jira_sync(&self) -> Result<usize> {
        self.sync_state
            .set_sync_status(SyncSource::Jira, SyncStatus::InProgress, None, None)
            .await?;
        info!("starting jira sync");

        let sprints = self
            .jira
            .fetch_sprints_with_issues(&self.settings.project_key)
            .await?;

        let count = sprints.len();
        if !sprints.is_empty() {
            self.sprints.upsert_sprints(sprints).await?;
        } else {
            warn!("jira sync returned no sprints");
        }

        Ok(count)
    }
}

impl std::fmt::Debug for SyncService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncService")
            .field("settings", &self.settings)
            .field("guards", &self.guards)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;
    use crate::prs::{NewPullRequest, PullRequest, PullRequestState};
    use crate::sprints::{NewSprint, Sprint, SprintState};
    use crate::sync::{NoopProgressReporter, RepoSpec, SyncMetadata};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryStore {
        prs: Mutex<Vec<PullRequest>>,
        sprints: Mutex<Vec<Sprint>>,
        metadata: Mutex<Vec<SyncMetadata>>,
        derived: Mutex<Option<serde_json::Value>>,
    }

    #[async_trait]
    impl PullRequestRepositoryTrait for MemoryStore {
        fn list_pull_requests(&self) -> Result<Vec<PullRequest>> {
            Ok(self.prs.lock().unwrap().clone())
        }

        async fn upsert_pull_requests(&self, batch: Vec<NewPullRequest>) -> Result<usize> {
            let mut rows = self.prs.lock().unwrap();
            for pr in &batch {
                rows.retain(|row| !(row.repo_name == pr.repo_name && row.number == pr.number));
                rows.push(PullRequest {
                    id: pr.id,
                    number: pr.number,
                    repo_name: pr.repo_name.clone(),
                    title: pr.title.clone(),
                    state: pr.state,
                    author_login: pr.author_login.clone(),
                    created_at: pr.created_at.clone(),
                    merged_at: pr.merged_at.clone(),
                    first_review_at: pr.first_review_at.clone(),
                    raw_json: pr.raw_json.clone(),
                    synced_at: Utc::now().to_rfc3339(),
                });
            }
            Ok(batch.len())
        }
    }

    #[async_trait]
    impl SprintRepositoryTrait for MemoryStore {
        fn list_sprints(&self) -> Result<Vec<Sprint>> {
            Ok(self.sprints.lock().unwrap().clone())
        }

        async fn upsert_sprints(&self, batch: Vec<NewSprint>) -> Result<usize> {
            let mut rows = self.sprints.lock().unwrap();
            for sprint in &batch {
                rows.retain(|row| row.id != sprint.id);
                rows.push(Sprint {
                    id: sprint.id,
                    board_id: sprint.board_id,
                    name: sprint.name.clone(),
                    state: sprint.state,
                    start_date: sprint.start_date.clone(),
                    end_date: sprint.end_date.clone(),
                    complete_date: sprint.complete_date.clone(),
                    committed_points: sprint.committed_points,
                    completed_points: sprint.completed_points,
                    completion_rate: sprint.completion_rate,
                    issue_count: sprint.issue_count,
                    raw_json: sprint.raw_json.clone(),
                    synced_at: Utc::now().to_rfc3339(),
                });
            }
            Ok(batch.len())
        }
    }

    #[async_trait]
    impl SyncStateRepositoryTrait for MemoryStore {
        fn get_sync_metadata(&self, source: SyncSource) -> Result<Option<SyncMetadata>> {
            Ok(self
                .metadata
                .lock()
                .unwrap()
                .iter()
                .find(|row| row.source == source)
                .cloned())
        }

        fn list_sync_metadata(&self) -> Result<Vec<SyncMetadata>> {
            Ok(self.metadata.lock().unwrap().clone())
        }

        async fn set_sync_status(
            &self,
            source: SyncSource,
            status: SyncStatus,
            error_msg: Option<String>,
            duration_ms: Option<i64>,
        ) -> Result<()> {
            let mut rows = self.metadata.lock().unwrap();
            rows.retain(|row| row.source != source);
            rows.push(SyncMetadata {
                source,
                last_sync_at: Utc::now().to_rfc3339(),
                status,
                error_msg,
                duration_ms,
            });
            Ok(())
        }
    }

    #[async_trait]
    impl DerivedCacheRepositoryTrait for MemoryStore {
        fn get_derived(&self, _cache_key: &str) -> Result<Option<serde_json::Value>> {
            Ok(self.derived.lock().unwrap().clone())
        }

        async fn put_derived(&self, _cache_key: &str, payload: serde_json::Value) -> Result<()> {
            *self.derived.lock().unwrap() = Some(payload);
            Ok(())
        }
    }

    /// Pull-request source that counts fetch sequences and can be stalled
    /// or failed on demand.
    struct FakeGithub {
        fetches: AtomicUsize,
        hold: Option<tokio::sync::Semaphore>,
        fail: bool,
    }

    impl FakeGithub {
        fn new() -> Self {
            Self {
                fetches: AtomicUsize::new(0),
                hold: None,
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::new()
            }
        }

        fn held() -> Self {
            Self {
                hold: Some(tokio::sync::Semaphore::new(0)),
                ..Self::new()
            }
        }
    }

    #[async_trait]
    impl PullRequestSource for FakeGithub {
        async fn fetch_pull_requests(&self, repo: &RepoSpec) -> Result<Vec<NewPullRequest>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if let Some(hold) = &self.hold {
                // Parked until the test releases the permit.
                let _ = hold.acquire().await;
            }
            if self.fail {
                return Err(Error::source("github unreachable"));
            }
            Ok(vec![NewPullRequest {
                id: 1,
                number: 7,
                repo_name: repo.full_name(),
                title: "Add retry budget".to_string(),
                state: PullRequestState::Open,
                author_login: "mira".to_string(),
                created_at: "2025-06-01T10:00:00Z".to_string(),
                merged_at: None,
                first_review_at: None,
                raw_json: None,
            }])
        }

        async fn fetch_first_review_at(&self, _repo: &RepoSpec, _number: i64) -> Option<String> {
            None
        }

        async fn fetch_commits(&self, _repo: &RepoSpec) -> Result<Vec<Commit>> {
            Ok(Vec::new())
        }
    }

    struct FakeJira;

    #[async_trait]
    impl SprintSource for FakeJira {
        async fn fetch_sprints_with_issues(&self, _project_key: &str) -> Result<Vec<NewSprint>> {
            Ok(vec![NewSprint {
                id: 42,
                board_id: 1,
                name: "Sprint 12".to_string(),
                state: SprintState::Closed,
                start_date: Some("2025-06-02T00:00:00Z".to_string()),
                end_date: Some("2025-06-16T00:00:00Z".to_string()),
                complete_date: None,
                committed_points: 20.0,
                completed_points: 15.0,
                completion_rate: 75.0,
                issue_count: 8,
                raw_json: None,
            }])
        }
    }

    fn settings_with_repo() -> SyncSettings {
        SyncSettings {
            repos: vec![RepoSpec::new("acme", "widgets")],
            ..SyncSettings::default()
        }
    }

    fn build_service(github: Arc<FakeGithub>, store: Arc<MemoryStore>) -> Arc<SyncService> {
        let pull_requests: Arc<dyn PullRequestRepositoryTrait> = store.clone();
        let sprints: Arc<dyn SprintRepositoryTrait> = store.clone();
        let sync_state: Arc<dyn SyncStateRepositoryTrait> = store.clone();
        Arc::new(SyncService::new(
            settings_with_repo(),
            github,
            Arc::new(FakeJira),
            pull_requests,
            sprints,
            sync_state,
            store,
            Arc::new(NoopProgressReporter),
        ))
    }

    #[tokio::test]
    async fn successful_sync_persists_rows_and_status() {
        let store = Arc::new(MemoryStore::default());
        let service = build_service(Arc::new(FakeGithub::new()), Arc::clone(&store));

        service.sync_github().await.unwrap();

        assert_eq!(store.prs.lock().unwrap().len(), 1);
        let metadata = store
            .metadata
            .lock()
            .unwrap()
            .iter()
            .find(|row| row.source == SyncSource::Github)
            .cloned()
            .unwrap();
        assert_eq!(metadata.status, SyncStatus::Success);
        assert!(metadata.duration_ms.is_some());
        assert!(store.derived.lock().unwrap().is_some());
    }

    #[tokio::test]
    async fn concurrent_github_sync_is_deduplicated() {
        let store = Arc::new(MemoryStore::default());
        let github = Arc::new(FakeGithub::held());
        let service = build_service(Arc::clone(&github), store);

        let first = {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.sync_github().await })
        };
        // Let the first run reach the fetch and park on the semaphore.
        tokio::task::yield_now().await;
        while github.fetches.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }

        // Second call must be a no-op while the first is in flight.
        service.sync_github().await.unwrap();
        assert_eq!(github.fetches.load(Ordering::SeqCst), 1);

        github.hold.as_ref().unwrap().add_permits(1);
        first.await.unwrap().unwrap();
        assert_eq!(github.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_source_yields_partial_aggregate_and_keeps_other_data() {
        let store = Arc::new(MemoryStore::default());
        let service = build_service(Arc::new(FakeGithub::failing()), Arc::clone(&store));

        let summary = service.sync_all().await;

        assert!(!summary.success);
        assert_eq!(summary.status, SyncStatus::Partial);
        assert_eq!(summary.errors.len(), 1);
        assert_eq!(summary.errors[0].source, SyncSource::Github);

        // Jira data is persisted and queryable despite the GitHub failure.
        assert_eq!(store.sprints.lock().unwrap().len(), 1);
        let github_meta = store
            .metadata
            .lock()
            .unwrap()
            .iter()
            .find(|row| row.source == SyncSource::Github)
            .cloned()
            .unwrap();
        assert_eq!(github_meta.status, SyncStatus::Error);
        assert!(github_meta.error_msg.is_some());

        // The guard was released despite the failure.
        assert!(!service.is_syncing(SyncSource::Github));
    }

    #[tokio::test]
    async fn staleness_follows_the_configured_window() {
        let store = Arc::new(MemoryStore::default());
        let service = build_service(Arc::new(FakeGithub::new()), Arc::clone(&store));

        // No metadata row at all: maximally stale.
        assert!(service.is_stale(SyncSource::Github));

        let set = |hours_ago: i64| SyncMetadata {
            source: SyncSource::Github,
            last_sync_at: (Utc::now() - Duration::hours(hours_ago)).to_rfc3339(),
            status: SyncStatus::Success,
            error_msg: None,
            duration_ms: Some(10),
        };

        *store.metadata.lock().unwrap() = vec![set(7)];
        assert!(service.is_stale(SyncSource::Github));

        *store.metadata.lock().unwrap() = vec![set(5)];
        assert!(!service.is_stale(SyncSource::Github));
    }

    #[tokio::test]
    async fn review_time_is_never_refetched_once_stored() {
        let store = Arc::new(MemoryStore::default());
        store.prs.lock().unwrap().push(PullRequest {
            id: 1,
            number: 7,
            repo_name: "acme/widgets".to_string(),
            title: "Add retry budget".to_string(),
            state: PullRequestState::Open,
            author_login: "mira".to_string(),
            created_at: "2025-06-01T10:00:00Z".to_string(),
            merged_at: None,
            first_review_at: Some("2025-06-02T09:00:00Z".to_string()),
            raw_json: None,
            synced_at: Utc::now().to_rfc3339(),
        });
        let service = build_service(Arc::new(FakeGithub::new()), Arc::clone(&store));

        service.sync_github().await.unwrap();

        // The fake source reports no reviews; the stored time must survive.
        let rows = store.prs.lock().unwrap();
        assert_eq!(
            rows[0].first_review_at.as_deref(),
            Some("2025-06-02T09:00:00Z")
        );
    }
}
