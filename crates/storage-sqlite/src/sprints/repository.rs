//! Repository for cached sprints.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::upsert::excluded;

use devpulse_core::sprints::{NewSprint, Sprint, SprintRepositoryTrait};
use devpulse_core::Result;

use super::model::SprintDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::sprints;

pub struct SprintRepository {
    pool: DbPool,
    writer: WriteHandle,
}

impl SprintRepository {
    pub fn new(pool: DbPool, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl SprintRepositoryTrait for SprintRepository {
    fn list_sprints(&self) -> Result<Vec<Sprint>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = sprints::table
            .order(sprints::start_date.asc())
            .load::<SprintDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(Sprint::from).collect())
    }

    async fn upsert_sprints(&self, batch: Vec<NewSprint>) -> Result<usize> {
        self.writer
            .exec(move |conn| {
                let now = Utc::now().to_rfc3339();
                let mut affected = 0;
                for sprint in &batch {
                    let row = SprintDB::from_new(sprint, &now);
                    affected += diesel::insert_into(sprints::table)
                        .values(&row)
                        .on_conflict(sprints::id)
                        .do_update()
                        .set((
                            sprints::name.eq(excluded(sprints::name)),
                            sprints::state.eq(excluded(sprints::state)),
                            sprints::start_date.eq(excluded(sprints::start_date)),
                            sprints::end_date.eq(excluded(sprints::end_date)),
                            sprints::complete_date.eq(excluded(sprints::complete_date)),
                            sprints::committed_points.eq(excluded(sprints::committed_points)),
                            sprints::completed_points.eq(excluded(sprints::completed_points)),
                            sprints::completion_rate.eq(excluded(sprints::completion_rate)),
                            sprints::issue_count.eq(excluded(sprints::issue_count)),
                            sprints::raw_json.eq(excluded(sprints::raw_json)),
                            sprints::synced_at.eq(excluded(sprints::synced_at)),
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
    use devpulse_core::sprints::SprintState;

    fn new_sprint(id: i64, start_date: &str) -> NewSprint {
        NewSprint {
            id,
            board_id: 7,
            name: format!("Sprint {id}"),
            state: SprintState::Closed,
            start_date: Some(start_date.to_string()),
            end_date: None,
            complete_date: None,
            committed_points: 20.0,
            completed_points: 15.0,
            completion_rate: 75.0,
            issue_count: 8,
            raw_json: None,
        }
    }

    #[tokio::test]
    async fn upsert_is_idempotent_on_id() {
        let (pool, writer) = setup_db();
        let repo = SprintRepository::new(pool, writer);

        repo.upsert_sprints(vec![new_sprint(1, "2025-06-01T00:00:00Z")])
            .await
            .unwrap();

        let mut updated = new_sprint(1, "2025-06-01T00:00:00Z");
        updated.completion_rate = 80.0;
        updated.completed_points = 16.0;
        repo.upsert_sprints(vec![updated]).await.unwrap();

        let rows = repo.list_sprints().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].completion_rate, 80.0);
        assert_eq!(rows[0].completed_points, 16.0);
    }

    #[tokio::test]
    async fn listing_is_ordered_by_start_date_ascending() {
        let (pool, writer) = setup_db();
        let repo = SprintRepository::new(pool, writer);

        repo.upsert_sprints(vec![
            new_sprint(2, "2025-07-01T00:00:00Z"),
            new_sprint(1, "2025-06-01T00:00:00Z"),
            new_sprint(3, "2025-08-01T00:00:00Z"),
        ])
        .await
        .unwrap();

        let rows = repo.list_sprints().unwrap();
        let ids: Vec<i64> = rows.iter().map(|sprint| sprint.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }
}
