//! Health/config-presence endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::SharedState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    status: &'static str,
    github: bool,
    jira: bool,
}

pub async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    let config = &state.config;
    Json(HealthResponse {
        status: "ok",
        github: config.github_token.is_some() && !config.repos.is_empty(),
        jira: config.jira_base_url.is_some() && config.jira_token.is_some(),
    })
}
