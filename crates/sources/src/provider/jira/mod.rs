//! Jira source provider.
//!
//! Traverses board → sprints → issues through the Agile REST API and
//! reduces each sprint's issues to committed/completed story points.
//! Projects with several boards are not disambiguated: the first board
//! returned wins, a known limitation carried over from the data source.

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use devpulse_core::analytics::sprints::sprint_metrics;
use devpulse_core::sprints::{NewSprint, SprintIssue, SprintState};
use devpulse_core::sync::SprintSource;

use crate::errors::SourceError;

const PROVIDER_ID: &str = "JIRA";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Sprint states worth caching; `future` sprints carry no outcome yet.
const SPRINT_STATES: &str = "closed,active";

/// Issue page cap per sprint.
const MAX_SPRINT_ISSUES: usize = 1000;

/// Candidate story-point custom fields, tried in order; the first
/// non-empty value wins. Configuration data, extend rather than branch.
pub const STORY_POINT_FIELDS: [&str; 3] = [
    "customfield_10031",
    "customfield_10016",
    "customfield_10100",
];

#[derive(Debug, Deserialize)]
struct BoardsResponse {
    #[serde(default)]
    values: Vec<BoardRef>,
}

#[derive(Debug, Deserialize)]
struct BoardRef {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct SprintsResponse {
    #[serde(default)]
    values: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SprintItem {
    id: i64,
    name: String,
    state: String,
    #[serde(default)]
    start_date: Option<String>,
    #[serde(default)]
    end_date: Option<String>,
    #[serde(default)]
    complete_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IssuesResponse {
    #[serde(default)]
    issues: Vec<serde_json::Value>,
}

/// Jira Agile REST client for board/sprint/issue traversal.
pub struct JiraProvider {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl JiraProvider {
    pub fn new(base_url: &str, token: Option<String>) -> Self {
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
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(token) = &self.token {
            if let Ok(value) = HeaderValue::from_str(&format!("Bearer {token}")) {
                headers.insert(AUTHORIZATION, value);
            }
        }
        headers
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, SourceError> {
        let url = format!("{}/{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .headers(self.headers())
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

    /// Resolve an issue's story points through the custom-field fallback
    /// chain. Empty means null, absent, zero or non-numeric.
    fn resolve_story_points(issue: &serde_json::Value) -> f64 {
        let fields = &issue["fields"];
        for field in STORY_POINT_FIELDS {
            let value = &fields[field];
            let points = match value {
                serde_json::Value::Number(number) => number.as_f64().unwrap_or(0.0),
                serde_json::Value::String(text) => text.parse::<f64>().unwrap_or(0.0),
                _ => 0.0,
            };
            if points != 0.0 {
                return points;
            }
        }
        0.0
    }

    fn issue_is_done(issue: &serde_json::Value) -> bool {
        issue["fields"]["status"]["statusCategory"]["key"]
            .as_str()
            .map(|key| key == "done")
            .unwrap_or(false)
    }

    fn reduce_issues(issues: &[serde_json::Value]) -> Vec<SprintIssue> {
        issues
            .iter()
            .map(|issue| SprintIssue {
                story_points: Self::resolve_story_points(issue),
                done: Self::issue_is_done(issue),
            })
            .collect()
    }
}

#[async_trait]
impl SprintSource for JiraProvider {
    async fn fetch_sprints_with_issues(
        &self,
        project_key: &str,
    ) -> devpulse_core::Result<Vec<NewSprint>> {
        let boards: BoardsResponse = self
            .get_json(&format!(
                "rest/agile/1.0/board?projectKeyOrId={project_key}"
            ))
            .await
            .map_err(devpulse_core::Error::from)?;

        let Some(board) = boards.values.first() else {
            warn!("no boards found for project {project_key}");
            return Ok(Vec::new());
        };
        if boards.values.len() > 1 {
            warn!(
                "project {project_key} has {} boards, using the first only",
                boards.values.len()
            );
        }

        let sprints: SprintsResponse = self
            .get_json(&format!(
                "rest/agile/1.0/board/{}/sprint?state={SPRINT_STATES}",
                board.id
            ))
            .await
            .map_err(devpulse_core::Error::from)?;

        let mut records = Vec::new();
        for value in &sprints.values {
            let item: SprintItem = match serde_json::from_value(value.clone()) {
                Ok(item) => item,
                Err(err) => {
                    warn!("skipping malformed sprint payload: {err}");
                    continue;
                }
            };

            let issues: IssuesResponse = self
                .get_json(&format!(
                    "rest/agile/1.0/sprint/{}/issue?maxResults={MAX_SPRINT_ISSUES}",
                    item.id
                ))
                .await
                .map_err(devpulse_core::Error::from)?;

            let metrics = sprint_metrics(&Self::reduce_issues(&issues.issues));
            records.push(NewSprint {
                id: item.id,
                board_id: board.id,
                name: item.name,
                state: SprintState::parse(&item.state),
                start_date: item.start_date,
                end_date: item.end_date,
                complete_date: item.complete_date,
                committed_points: metrics.committed_points,
                completed_points: metrics.completed_points,
                completion_rate: metrics.completion_rate,
                issue_count: metrics.issue_count,
                raw_json: Some(value.to_string()),
            });
        }

        debug!(
            "fetched {} sprints for project {project_key}",
            records.len()
        );
        Ok(records)
    }
}
