//! Dashboard data and sync endpoints.
//!
//! `GET /data` returns everything the front end renders in one shot:
//! cached pull requests and sprints, the derived member stats and the
//! per-source sync status with staleness flags. A stale source triggers a
//! background refresh; the response never waits for it.

use std::collections::BTreeMap;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use devpulse_core::analytics::prs::{pr_stats, prs_by_month, MonthlyPrStats, PrStats};
use devpulse_core::analytics::sprints::{sprint_stats, SprintStats};
use devpulse_core::analytics::summary::{summarize, Summary};
use devpulse_core::prs::PullRequest;
use devpulse_core::sprints::Sprint;
use devpulse_core::sync::{SyncMetadata, SyncSource, SyncStatus, MEMBER_STATS_CACHE_KEY};

use crate::error::{ApiError, ApiResult};
use crate::state::SharedState;

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/data", get(get_data))
        .route("/metrics", get(get_metrics))
        .route("/sync", post(trigger_sync))
        .route("/sync/status", get(sync_status))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SourceStatus {
    last_sync_at: Option<String>,
    status: SyncStatus,
    is_stale: bool,
    duration_ms: Option<i64>,
    error_msg: Option<String>,
}

impl SourceStatus {
    fn from_metadata(metadata: Option<SyncMetadata>, is_stale: bool) -> Self {
        Self {
            last_sync_at: metadata.as_ref().map(|m| m.last_sync_at.clone()),
            status: metadata
                .as_ref()
                .map(|m| m.status)
                .unwrap_or(SyncStatus::Never),
            is_stale,
            duration_ms: metadata.as_ref().and_then(|m| m.duration_ms),
            error_msg: metadata.and_then(|m| m.error_msg),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DashboardData {
    pull_requests: Vec<PullRequest>,
    sprints: Vec<Sprint>,
    member_stats: serde_json::Value,
    sync_status: BTreeMap<SyncSource, SourceStatus>,
}

async fn get_data(State(state): State<SharedState>) -> ApiResult<Json<DashboardData>> {
    let pull_requests = state
        .pull_requests
        .list_pull_requests()
        .map_err(ApiError::from)?;
    let sprints = state.sprints.list_sprints().map_err(ApiError::from)?;
    let member_stats = state
        .derived
        .get_derived(MEMBER_STATS_CACHE_KEY)
        .map_err(ApiError::from)?
        .unwrap_or_else(|| serde_json::Value::Array(Vec::new()));

    let mut sync_status = BTreeMap::new();
    for source in SyncSource::ALL {
        let metadata = state
            .sync_state
            .get_sync_metadata(source)
            .map_err(ApiError::from)?;
        let is_stale = state.sync_service.is_stale(source);
        if is_stale {
            debug!("{source} cache is stale, triggering background sync");
            state.sync_service.trigger_background(Some(source));
        }
        sync_status.insert(source, SourceStatus::from_metadata(metadata, is_stale));
    }

    Ok(Json(DashboardData {
        pull_requests,
        sprints,
        member_stats,
        sync_status,
    }))
}

#[derive(Debug, Deserialize)]
struct MetricsQuery {
    /// Overrides the configured pivot date, `YYYY-MM-DD`.
    pivot: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MetricsResponse {
    pivot_date: NaiveDate,
    pr_stats: PrStats,
    monthly: Vec<MonthlyPrStats>,
    sprint_stats: SprintStats,
    summary: Summary,
}

/// Pivot-split aggregates derived on demand from the cached corpus.
async fn get_metrics(
    State(state): State<SharedState>,
    Query(query): Query<MetricsQuery>,
) -> ApiResult<Json<MetricsResponse>> {
    let pivot = query.pivot.unwrap_or(state.config.pivot_date);
    let prs = state
        .pull_requests
        .list_pull_requests()
        .map_err(ApiError::from)?;
    let sprints = state.sprints.list_sprints().map_err(ApiError::from)?;

    let pr_stats = pr_stats(&prs, pivot);
    let sprint_stats = sprint_stats(&sprints, pivot);
    let summary = summarize(&pr_stats, &sprint_stats);

    Ok(Json(MetricsResponse {
        pivot_date: pivot,
        pr_stats,
        monthly: prs_by_month(&prs),
        sprint_stats,
        summary,
    }))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TriggerSyncRequest {
    source: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TriggerSyncResponse {
    message: String,
    syncing: BTreeMap<SyncSource, bool>,
}

async fn trigger_sync(
    State(state): State<SharedState>,
    body: Option<Json<TriggerSyncRequest>>,
) -> ApiResult<(StatusCode, Json<TriggerSyncResponse>)> {
    let requested = body.and_then(|Json(request)| request.source);
    let source = match requested.as_deref() {
        Some(raw) => Some(SyncSource::parse(raw).ok_or_else(|| {
            ApiError::BadRequest("Invalid source. Use \"github\" or \"jira\".".to_string())
        })?),
        None => None,
    };

    state.sync_service.trigger_background(source);

    let target = source
        .map(|source| source.to_string())
        .unwrap_or_else(|| "all sources".to_string());
    Ok((
        StatusCode::ACCEPTED,
        Json(TriggerSyncResponse {
            message: format!("Sync triggered for {target}"),
            syncing: state.sync_service.syncing_map(),
        }),
    ))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SyncStatusResponse {
    syncing: BTreeMap<SyncSource, bool>,
    sources: BTreeMap<SyncSource, SourceStatus>,
}

async fn sync_status(State(state): State<SharedState>) -> ApiResult<Json<SyncStatusResponse>> {
    let mut sources = BTreeMap::new();
    for metadata in state
        .sync_state
        .list_sync_metadata()
        .map_err(ApiError::from)?
    {
        let source = metadata.source;
        let is_stale = state.sync_service.is_stale(source);
        sources.insert(source, SourceStatus::from_metadata(Some(metadata), is_stale));
    }

    Ok(Json(SyncStatusResponse {
        syncing: state.sync_service.syncing_map(),
        sources,
    }))
}
