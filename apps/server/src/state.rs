//! Shared application state and its construction.

use std::sync::Arc;

use devpulse_core::prs::PullRequestRepositoryTrait;
use devpulse_core::sprints::SprintRepositoryTrait;
use devpulse_core::sync::{
    DerivedCacheRepositoryTrait, SyncService, SyncStateRepositoryTrait,
};
use devpulse_sources::{GithubProvider, JiraProvider};
use devpulse_storage_sqlite::{
    create_pool, init, run_migrations, spawn_writer, DerivedCacheRepository,
    PullRequestRepository, SprintRepository, SyncStateRepository,
};

use crate::config::ServerConfig;
use crate::events::{EventBus, EventBusProgressReporter};

pub struct AppState {
    pub sync_service: Arc<SyncService>,
    pub pull_requests: Arc<dyn PullRequestRepositoryTrait>,
    pub sprints: Arc<dyn SprintRepositoryTrait>,
    pub sync_state: Arc<dyn SyncStateRepositoryTrait>,
    pub derived: Arc<dyn DerivedCacheRepositoryTrait>,
    pub event_bus: EventBus,
    pub config: ServerConfig,
}

pub type SharedState = Arc<AppState>;

/// Open the database, run migrations and wire repositories, providers and
/// the sync service together.
pub fn build_state(config: ServerConfig) -> devpulse_core::Result<SharedState> {
    let db_path = init(&config.data_dir)?;
    run_migrations(&db_path)?;
    let pool = create_pool(&db_path)?;
    let writer = spawn_writer(pool.as_ref().clone());

    let pull_requests: Arc<dyn PullRequestRepositoryTrait> =
        Arc::new(PullRequestRepository::new(pool.clone(), writer.clone()));
    let sprints: Arc<dyn SprintRepositoryTrait> =
        Arc::new(SprintRepository::new(pool.clone(), writer.clone()));
    let sync_state: Arc<dyn SyncStateRepositoryTrait> =
        Arc::new(SyncStateRepository::new(pool.clone(), writer.clone()));
    let derived: Arc<dyn DerivedCacheRepositoryTrait> =
        Arc::new(DerivedCacheRepository::new(pool, writer));

    let github = Arc::new(GithubProvider::new(config.github_token.clone()));
    let jira = Arc::new(JiraProvider::new(
        config.jira_base_url.as_deref().unwrap_or_default(),
        config.jira_token.clone(),
    ));

    let event_bus = EventBus::new();
    let reporter = Arc::new(EventBusProgressReporter::new(event_bus.clone()));

    let sync_service = Arc::new(SyncService::new(
        config.sync_settings(),
        github,
        jira,
        Arc::clone(&pull_requests),
        Arc::clone(&sprints),
        Arc::clone(&sync_state),
        Arc::clone(&derived),
        reporter,
    ));

    Ok(Arc::new(AppState {
        sync_service,
        pull_requests,
        sprints,
        sync_state,
        derived,
        event_bus,
        config,
    }))
}
