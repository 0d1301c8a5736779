//! Storage-layer error type and its mapping into the core error.

use devpulse_core::errors::{DatabaseError, Error};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Query failed: {0}")]
    Query(#[from] diesel::result::Error),

    #[error("Connection failed: {0}")]
    Connection(#[from] diesel::ConnectionError),

    #[error("Pool error: {0}")]
    Pool(String),

    #[error("Migration failed: {0}")]
    Migration(String),
}

impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        let database = match err {
            StorageError::Query(inner) => DatabaseError::QueryFailed(inner.to_string()),
            StorageError::Connection(inner) => DatabaseError::ConnectionFailed(inner.to_string()),
            StorageError::Pool(inner) => DatabaseError::ConnectionFailed(inner),
            StorageError::Migration(inner) => DatabaseError::MigrationFailed(inner),
        };
        Error::Database(database)
    }
}
