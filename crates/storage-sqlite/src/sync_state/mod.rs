//! SQLite storage for sync metadata and derived-analytics blobs.

mod model;
mod repository;

pub use model::{DerivedCacheDB, SyncMetadataDB};
pub use repository::{DerivedCacheRepository, SyncStateRepository};
