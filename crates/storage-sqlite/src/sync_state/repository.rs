//! Repositories for sync metadata rows and derived-analytics blobs.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;

use devpulse_core::sync::{
    DerivedCacheRepositoryTrait, SyncMetadata, SyncSource, SyncStateRepositoryTrait, SyncStatus,
};
use devpulse_core::Result;

use super::model::{DerivedCacheDB, SyncMetadataDB};
use crate::db::{enum_from_db, enum_to_db, get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::{derived_cache, sync_metadata};

fn to_metadata(row: SyncMetadataDB) -> Result<SyncMetadata> {
    Ok(SyncMetadata {
        source: enum_from_db(&row.source)?,
        last_sync_at: row.last_sync_at,
        status: enum_from_db(&row.status)?,
        error_msg: row.error_msg,
        duration_ms: row.duration_ms,
    })
}

pub struct SyncStateRepository {
    pool: DbPool,
    writer: WriteHandle,
}

impl SyncStateRepository {
    pub fn new(pool: DbPool, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl SyncStateRepositoryTrait for SyncStateRepository {
    fn get_sync_metadata(&self, source: SyncSource) -> Result<Option<SyncMetadata>> {
        let mut conn = get_connection(&self.pool)?;
        let row = sync_metadata::table
            .find(source.as_str())
            .first::<SyncMetadataDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        row.map(to_metadata).transpose()
    }

    fn list_sync_metadata(&self) -> Result<Vec<SyncMetadata>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = sync_metadata::table
            .load::<SyncMetadataDB>(&mut conn)
            .map_err(StorageError::from)?;
        rows.into_iter().map(to_metadata).collect()
    }

    async fn set_sync_status(
        &self,
        source: SyncSource,
        status: SyncStatus,
        error_msg: Option<String>,
        duration_ms: Option<i64>,
    ) -> Result<()> {
        self.writer
            .exec(move |conn| {
                let row = SyncMetadataDB {
                    source: enum_to_db(&source)?,
                    last_sync_at: Utc::now().to_rfc3339(),
                    status: enum_to_db(&status)?,
                    error_msg,
                    duration_ms,
                };

                diesel::insert_into(sync_metadata::table)
                    .values(&row)
                    .on_conflict(sync_metadata::source)
                    .do_update()
                    .set((
                        sync_metadata::last_sync_at.eq(row.last_sync_at.clone()),
                        sync_metadata::status.eq(row.status.clone()),
                        sync_metadata::error_msg.eq(row.error_msg.clone()),
                        sync_metadata::duration_ms.eq(row.duration_ms),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }
}

pub struct DerivedCacheRepository {
    pool: DbPool,
    writer: WriteHandle,
}

impl DerivedCacheRepository {
    pub fn new(pool: DbPool, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl DerivedCacheRepositoryTrait for DerivedCacheRepository {
    fn get_derived(&self, cache_key: &str) -> Result<Option<serde_json::Value>> {
        let mut conn = get_connection(&self.pool)?;
        let row = derived_cache::table
            .find(cache_key)
            .first::<DerivedCacheDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;

        row.map(|row| Ok(serde_json::from_str(&row.payload)?)).transpose()
    }

    async fn put_derived(&self, cache_key: &str, payload: serde_json::Value) -> Result<()> {
        let cache_key = cache_key.to_string();
        self.writer
            .exec(move |conn| {
                let row = DerivedCacheDB {
                    cache_key,
                    payload: serde_json::to_string(&payload)?,
                    computed_at: Utc::now().to_rfc3339(),
                };

                diesel::insert_into(derived_cache::table)
                    .values(&row)
                    .on_conflict(derived_cache::cache_key)
                    .do_update()
                    .set((
                        derived_cache::payload.eq(row.payload.clone()),
                        derived_cache::computed_at.eq(row.computed_at.clone()),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::setup_db;
    use serde_json::json;

    #[tokio::test]
    async fn status_upsert_keeps_one_row_per_source() {
        let (pool, writer) = setup_db();
        let repo = SyncStateRepository::new(pool, writer);

        repo.set_sync_status(SyncSource::Github, SyncStatus::InProgress, None, None)
            .await
            .unwrap();
        let in_progress = repo
            .get_sync_metadata(SyncSource::Github)
            .unwrap()
            .unwrap();
        assert_eq!(in_progress.status, SyncStatus::InProgress);

        repo.set_sync_status(SyncSource::Github, SyncStatus::Success, None, Some(1234))
            .await
            .unwrap();

        let rows = repo.list_sync_metadata().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].status, SyncStatus::Success);
        assert_eq!(rows[0].duration_ms, Some(1234));
        assert!(rows[0].last_sync_at >= in_progress.last_sync_at);
    }

    #[tokio::test]
    async fn error_status_carries_the_message() {
        let (pool, writer) = setup_db();
        let repo = SyncStateRepository::new(pool, writer);

        repo.set_sync_status(
            SyncSource::Jira,
            SyncStatus::Error,
            Some("HTTP 503".to_string()),
            Some(20),
        )
        .await
        .unwrap();

        let metadata = repo.get_sync_metadata(SyncSource::Jira).unwrap().unwrap();
        assert_eq!(metadata.status, SyncStatus::Error);
        assert_eq!(metadata.error_msg.as_deref(), Some("HTTP 503"));
        assert!(repo.get_sync_metadata(SyncSource::Github).unwrap().is_none());
    }

    #[tokio::test]
    async fn derived_cache_roundtrips_and_overwrites() {
        let (pool, writer) = setup_db();
        let repo = DerivedCacheRepository::new(pool, writer);

        assert!(repo.get_derived("member_stats").unwrap().is_none());

        repo.put_derived("member_stats", json!([{ "username": "mira" }]))
            .await
            .unwrap();
        repo.put_derived("member_stats", json!([{ "username": "kai" }]))
            .await
            .unwrap();

        let blob = repo.get_derived("member_stats").unwrap().unwrap();
        assert_eq!(blob[0]["username"], "kai");
    }
}
