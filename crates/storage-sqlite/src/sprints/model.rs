//! Database model for the sprints table.

use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use devpulse_core::sprints::{NewSprint, Sprint, SprintState};

#[derive(
    Queryable,
    Identifiable,
    Insertable,
    AsChangeset,
    Selectable,
    Debug,
    Clone,
    Serialize,
    Deserialize,
)]
#[diesel(table_name = crate::schema::sprints)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SprintDB {
    pub id: i64,
    pub board_id: i64,
    pub name: String,
    pub state: String,
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

impl SprintDB {
    pub fn from_new(sprint: &NewSprint, synced_at: &str) -> Self {
        Self {
            id: sprint.id,
            board_id: sprint.board_id,
            name: sprint.name.clone(),
            state: sprint.state.as_str().to_string(),
            start_date: sprint.start_date.clone(),
            end_date: sprint.end_date.clone(),
            complete_date: sprint.complete_date.clone(),
            committed_points: sprint.committed_points,
            completed_points: sprint.completed_points,
            completion_rate: sprint.completion_rate,
            issue_count: sprint.issue_count,
            raw_json: sprint.raw_json.clone(),
            synced_at: synced_at.to_string(),
        }
    }
}

impl From<SprintDB> for Sprint {
    fn from(row: SprintDB) -> Self {
        Sprint {
            id: row.id,
            board_id: row.board_id,
            name: row.name,
            state: SprintState::parse(&row.state),
            start_date: row.start_date,
            end_date: row.end_date,
            complete_date: row.complete_date,
            committed_points: row.committed_points,
            completed_points: row.completed_points,
            completion_rate: row.completion_rate,
            issue_count: row.issue_count,
            raw_json: row.raw_json,
            synced_at: row.synced_at,
        }
    }
}
