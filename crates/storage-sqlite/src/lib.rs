//! SQLite storage implementation for the DevPulse cache.
//!
//! Repositories implement the `devpulse-core` traits over a diesel/r2d2
//! pool. Reads use pooled connections directly; writes run on the
//! serialized write actor, one transaction per job.

pub mod db;
pub mod errors;
pub mod pull_requests;
pub mod schema;
pub mod sprints;
pub mod sync_state;

pub use db::{create_pool, get_connection, init, run_migrations, spawn_writer, DbPool, WriteHandle};
pub use errors::StorageError;
pub use pull_requests::PullRequestRepository;
pub use sprints::SprintRepository;
pub use sync_state::{DerivedCacheRepository, SyncStateRepository};
