//! SQLite connection management: pool, pragmas, embedded migrations and
//! the serialized write actor.
//!
//! Reads go straight through the r2d2 pool. All writes funnel through a
//! single writer thread; each submitted job runs inside one immediate
//! transaction, so a batch either commits whole or not at all, and
//! concurrent writers never contend on SQLite's single-writer lock.

use std::path::Path;
use std::sync::Arc;

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool, PooledConnection};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

use devpulse_core::errors::{DatabaseError, Error, Result};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

pub type DbPool = Arc<Pool<ConnectionManager<SqliteConnection>>>;
pub type DbConnection = PooledConnection<ConnectionManager<SqliteConnection>>;

const DB_FILE_NAME: &str = "devpulse.db";

#[derive(Debug)]
struct ConnectionCustomizer;

impl diesel::r2d2::CustomizeConnection<SqliteConnection, diesel::r2d2::Error>
    for ConnectionCustomizer
{
    fn on_acquire(
        &self,
        conn: &mut SqliteConnection,
    ) -> std::result::Result<(), diesel::r2d2::Error> {
        // WAL so readers are never blocked by the writer thread.
        conn.batch_execute(
            "PRAGMA journal_mode = WAL; PRAGMA busy_timeout = 5000; PRAGMA foreign_keys = ON;",
        )
        .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Ensure the data directory exists and return the database file path.
pub fn init(app_data_dir: &str) -> Result<String> {
    let dir = Path::new(app_data_dir);
    std::fs::create_dir_all(dir).map_err(|err| {
        Error::Database(DatabaseError::Internal(format!(
            "Failed creating data dir {}: {err}",
            dir.display()
        )))
    })?;
    Ok(dir.join(DB_FILE_NAME).to_string_lossy().to_string())
}

pub fn run_migrations(db_path: &str) -> Result<()> {
    let mut conn = SqliteConnection::establish(db_path)
        .map_err(|err| Error::Database(DatabaseError::ConnectionFailed(err.to_string())))?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|err| Error::Database(DatabaseError::MigrationFailed(err.to_string())))?;
    Ok(())
}

pub fn create_pool(db_path: &str) -> Result<DbPool> {
    let manager = ConnectionManager::<SqliteConnection>::new(db_path);
    let pool = Pool::builder()
        .max_size(8)
        .connection_customizer(Box::new(ConnectionCustomizer))
        .build(manager)
        .map_err(|err| Error::Database(DatabaseError::ConnectionFailed(err.to_string())))?;
    Ok(Arc::new(pool))
}

pub fn get_connection(pool: &DbPool) -> Result<DbConnection> {
    pool.get()
        .map_err(|err| Error::Database(DatabaseError::ConnectionFailed(err.to_string())))
}

/// Serialize an enum into its bare DB text form (serde name without
/// quotes).
pub(crate) fn enum_to_db<T: serde::Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?.trim_matches('"').to_string())
}

pub(crate) fn enum_from_db<T: serde::de::DeserializeOwned>(value: &str) -> Result<T> {
    Ok(serde_json::from_str(&format!("\"{}\"", value))?)
}

pub mod write_actor {
    //! Dedicated writer thread. Jobs are closures over a mutable
    //! connection; each job is wrapped in an immediate transaction.

    use super::*;
    use tokio::sync::{mpsc, oneshot};

    type WriteJob = Box<dyn FnOnce(&mut SqliteConnection) + Send + 'static>;

    /// Cloneable handle submitting jobs to the writer thread.
    #[derive(Clone)]
    pub struct WriteHandle {
        sender: mpsc::UnboundedSender<WriteJob>,
    }

    impl WriteHandle {
        /// Run `job` on the writer thread inside one transaction and wait
        /// for its result. A job error rolls the transaction back.
        pub async fn exec<T, F>(&self, job: F) -> Result<T>
        where
            T: Send + 'static,
            F: FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static,
        {
            let (result_tx, result_rx) = oneshot::channel();

            let wrapped: WriteJob = Box::new(move |conn| {
                let mut job_result: Option<Result<T>> = None;
                let tx_result =
                    conn.immediate_transaction::<(), diesel::result::Error, _>(|tx_conn| {
                        match job(tx_conn) {
                            Ok(value) => {
                                job_result = Some(Ok(value));
                                Ok(())
                            }
                            Err(err) => {
                                job_result = Some(Err(err));
                                Err(diesel::result::Error::RollbackTransaction)
                            }
                        }
                    });

                let outcome = match tx_result {
                    Ok(()) => job_result.expect("committed job produced a result"),
                    Err(tx_err) => match job_result {
                        // The job itself failed; the rollback marker is noise.
                        Some(Err(job_err)) => Err(job_err),
                        _ => Err(Error::Database(DatabaseError::QueryFailed(
                            tx_err.to_string(),
                        ))),
                    },
                };
                let _ = result_tx.send(outcome);
            });

            self.sender.send(wrapped).map_err(|_| {
                Error::Database(DatabaseError::Internal(
                    "Write actor is not running".to_string(),
                ))
            })?;

            result_rx.await.map_err(|_| {
                Error::Database(DatabaseError::Internal(
                    "Write actor dropped the job".to_string(),
                ))
            })?
        }
    }

    /// Spawn the writer thread over its own pool handle.
    pub fn spawn_writer(pool: Pool<ConnectionManager<SqliteConnection>>) -> WriteHandle {
        let (sender, mut receiver) = mpsc::unbounded_channel::<WriteJob>();

        std::thread::Builder::new()
            .name("devpulse-sqlite-writer".to_string())
            .spawn(move || {
                while let Some(job) = receiver.blocking_recv() {
                    match pool.get() {
                        Ok(mut conn) => job(&mut conn),
                        // Dropping the job wakes the submitter with an error.
                        Err(err) => log::error!("writer could not get a connection: {err}"),
                    }
                }
            })
            .expect("failed to spawn sqlite writer thread");

        WriteHandle { sender }
    }
}

pub use write_actor::{spawn_writer, WriteHandle};
