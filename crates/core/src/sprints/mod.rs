//! Sprint domain models and repository contract.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::Result;

/// Sprint lifecycle state on the issue tracker. Only `active` and `closed`
/// sprints are fetched; `future` exists for completeness when parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SprintState {
    Active,
    Closed,
    Future,
}

impl SprintState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Closed => "closed",
            Self::Future => "future",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "active" => Self::Active,
            "closed" => Self::Closed,
            _ => Self::Future,
        }
    }
}

/// A cached sprint row. `id` is the source-assigned dedup key.
///
/// `completion_rate` is derived from the issue set on every sync and stored
/// only for cheap reads; it is never the source of truth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sprint {
    pub id: i64,
    pub board_id: i64,
    pub name: String,
    pub state: SprintState,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub complete_date: Option<String>,
    pub committed_points: f64,
    pub completed_points: f64,
    pub completion_rate: f64,
    pub issue_count: i64,
    pub raw_json: Option<String>,
    pub synced_at: String,
}

/// A sprint as assembled from the tracker, before persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSprint {
    pub id: i64,
    pub board_id: i64,
    pub name: String,
    pub state: SprintState,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub complete_date: Option<String>,
    pub committed_points: f64,
    pub completed_points: f64,
    pub completion_rate: f64,
    pub issue_count: i64,
    pub raw_json: Option<String>,
}

/// One sprint issue reduced to what the metrics need: its resolved story
/// points (after the custom-field fallback chain) and whether its status
/// category is "done".
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SprintIssue {
    pub story_points: f64,
    pub done: bool,
}

/// Repository contract implemented by the storage crate.
#[async_trait]
pub trait SprintRepositoryTrait: Send + Sync {
    /// All cached sprints, ordered by `start_date` ascending.
    fn list_sprints(&self) -> Result<Vec<Sprint>>;

    /// Transactional batch upsert keyed by `id`.
    async fn upsert_sprints(&self, batch: Vec<NewSprint>) -> Result<usize>;
}
