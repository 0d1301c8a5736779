//! Database model for the pull_requests table.

use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use devpulse_core::prs::{NewPullRequest, PullRequest, PullRequestState};

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
#[diesel(primary_key(repo_name, number))]
#[diesel(table_name = crate::schema::pull_requests)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PullRequestDB {
    pub id: i64,
    pub number: i64,
    pub repo_name: String,
    pub title: String,
    pub state: String,
    pub author_login: String,
    pub created_at: String,
    pub merged_at: Option<String>,
    pub first_review_at: Option<String>,
    pub raw_json: Option<String>,
    pub synced_at: String,
}

impl PullRequestDB {
    pub fn from_new(pr: &NewPullRequest, synced_at: &str) -> Self {
        Self {
            id: pr.id,
            number: pr.number,
            repo_name: pr.repo_name.clone(),
            title: pr.title.clone(),
            state: pr.state.as_str().to_string(),
            author_login: pr.author_login.clone(),
            created_at: pr.created_at.clone(),
            merged_at: pr.merged_at.clone(),
            first_review_at: pr.first_review_at.clone(),
            raw_json: pr.raw_json.clone(),
            synced_at: synced_at.to_string(),
        }
    }
}

impl From<PullRequestDB> for PullRequest {
    fn from(row: PullRequestDB) -> Self {
        PullRequest {
            id: row.id,
            number: row.number,
            repo_name: row.repo_name,
            title: row.title,
            state: PullRequestState::parse(&row.state),
            author_login: row.author_login,
            created_at: row.created_at,
            merged_at: row.merged_at,
            first_review_at: row.first_review_at,
            raw_json: row.raw_json,
            synced_at: row.synced_at,
        }
    }
}
