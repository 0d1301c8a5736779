//! Database models for sync metadata and the derived cache.

use diesel::prelude::*;
use serde::{Deserialize, Serialize};

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
#[diesel(primary_key(source))]
#[diesel(table_name = crate::schema::sync_metadata)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SyncMetadataDB {
    pub source: String,
    pub last_sync_at: String,
    pub status: String,
    pub error_msg: Option<String>,
    pub duration_ms: Option<i64>,
}

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
#[diesel(primary_key(cache_key))]
#[diesel(table_name = crate::schema::derived_cache)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DerivedCacheDB {
    pub cache_key: String,
    pub payload: String,
    pub computed_at: String,
}
