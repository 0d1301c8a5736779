//! Repository for cached pull requests.

use async_trait::async_trait;
use chrono::Utc;
use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::sql_types::{Nullable, Text};
use diesel::upsert::excluded;

use devpulse_core::prs::{NewPullRequest, PullRequest, PullRequestRepositoryTrait};
use devpulse_core::Result;

use super::model::PullRequestDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::pull_requests;

pub struct PullRequestRepository {
    pool: DbPool,
    writer: WriteHandle,
}

impl PullRequestRepository {
    pub fn new(pool: DbPool, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl PullRequestRepositoryTrait for PullRequestRepository {
    fn list_pull_requests(&self) -> Result<Vec<PullRequest>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = pull_requests::table
            .order(pull_requests::created_at.desc())
            .load::<PullRequestDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(PullRequest::from).collect())
    }

    async fn upsert_pull_requests(&self, batch: Vec<NewPullRequest>) -> Result<usize> {
        self.writer
            .exec(move |conn| {
                let now = Utc::now().to_rfc3339();
                let mut affected = 0;
                for pr in &batch {
                    let row = PullRequestDB::from_new(pr, &now);
                    affected += diesel::insert_into(pull_requests::table)
                        .values(&row)
                        .on_conflict((pull_requests::repo_name, pull_requests::number))
                        .do_update()
                        .set((
                            pull_requests::title.eq(excluded(pull_requests::title)),
                            pull_requests::state.eq(excluded(pull_requests::state)),
                            pull_requests::merged_at.eq(excluded(pull_requests::merged_at)),
                            // A re-sync without review data must not null
                            // out a stored review time.
                            pull_requests::first_review_at.eq(sql::<Nullable<Text>>(
                                "COALESCE(excluded.first_review_at, pull_requests.first_review_at)",
                            )),
                            pull_requests::raw_json.eq(excluded(pull_requests::raw_json)),
                            pull_requests::synced_at.eq(excluded(pull_requests::synced_at)),
                        ))
                        .execute(conn)
                        .map_err(StorageError::from)?;
                }
                Ok(affected)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::setup_db;
    use devpulse_core::prs::PullRequestState;

    fn new_pr(number: i64, first_review_at: Option<&str>) -> NewPullRequest {
        NewPullRequest {
            id: 1000 + number,
            number,
            repo_name: "acme/widgets".to_string(),
            title: format!("PR {number}"),
            state: PullRequestState::Open,
            author_login: "mira".to_string(),
            created_at: format!("2025-06-{:02}T10:00:00Z", number),
            merged_at: None,
            first_review_at: first_review_at.map(str::to_string),
            raw_json: Some("{}".to_string()),
        }
    }

    #[tokio::test]
    async fn upsert_is_idempotent_on_repo_and_number() {
        let (pool, writer) = setup_db();
        let repo = PullRequestRepository::new(pool, writer);

        repo.upsert_pull_requests(vec![new_pr(1, None), new_pr(2, None)])
            .await
            .unwrap();
        let first_pass = repo.list_pull_requests().unwrap();
        assert_eq!(first_pass.len(), 2);
        let first_synced_at = first_pass[0].synced_at.clone();

        repo.upsert_pull_requests(vec![new_pr(1, None), new_pr(2, None)])
            .await
            .unwrap();
        let second_pass = repo.list_pull_requests().unwrap();
        assert_eq!(second_pass.len(), 2);
        assert!(second_pass[0].synced_at >= first_synced_at);
    }

    #[tokio::test]
    async fn conflicting_upsert_preserves_created_at_and_id() {
        let (pool, writer) = setup_db();
        let repo = PullRequestRepository::new(pool, writer);

        repo.upsert_pull_requests(vec![new_pr(1, None)]).await.unwrap();

        let mut changed = new_pr(1, None);
        changed.id = 9999;
        changed.created_at = "2026-01-01T00:00:00Z".to_string();
        changed.title = "Renamed".to_string();
        repo.upsert_pull_requests(vec![changed]).await.unwrap();

        let rows = repo.list_pull_requests().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, 1001);
        assert_eq!(rows[0].created_at, "2025-06-01T10:00:00Z");
        assert_eq!(rows[0].title, "Renamed");
    }

    #[tokio::test]
    async fn review_time_is_never_regressed_to_null() {
        let (pool, writer) = setup_db();
        let repo = PullRequestRepository::new(pool, writer);

        repo.upsert_pull_requests(vec![new_pr(1, Some("2025-06-02T09:00:00Z"))])
            .await
            .unwrap();
        repo.upsert_pull_requests(vec![new_pr(1, None)]).await.unwrap();

        let rows = repo.list_pull_requests().unwrap();
        assert_eq!(
            rows[0].first_review_at.as_deref(),
            Some("2025-06-02T09:00:00Z")
        );

        // A later non-null value still overwrites.
        repo.upsert_pull_requests(vec![new_pr(1, Some("2025-06-03T09:00:00Z"))])
            .await
            .unwrap();
        let rows = repo.list_pull_requests().unwrap();
        assert_eq!(
            rows[0].first_review_at.as_deref(),
            Some("2025-06-03T09:00:00Z")
        );
    }

    #[tokio::test]
    async fn listing_is_ordered_by_created_at_descending() {
        let (pool, writer) = setup_db();
        let repo = PullRequestRepository::new(pool, writer);

        repo.upsert_pull_requests(vec![new_pr(1, None), new_pr(3, None), new_pr(2, None)])
            .await
            .unwrap();

        let rows = repo.list_pull_requests().unwrap();
        let numbers: Vec<i64> = rows.iter().map(|pr| pr.number).collect();
        assert_eq!(numbers, vec![3, 2, 1]);
    }
}
