//! SQLite storage bootstrap, schema migrations and the shared connection.
//!
//! # Responsibility
//! - Open and configure SQLite connections for the duty board.
//! - Apply schema migrations in deterministic order.
//! - Own the process-scoped connection handle and its lifecycle.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - No duty data is read or written before migrations succeed.

use thiserror::Error;

pub mod migrations;
mod open;
pub mod shared;

pub use open::{open_db, open_db_in_memory};
pub use shared::{init_shared_db, shared_db, shutdown_shared_db, SharedDb};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("{0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("database schema version {db_version} is newer than supported {latest_supported}")]
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    #[error("database connection is closed")]
    Closed,
    #[error("shared database already initialized at `{active}`; refusing to switch to `{requested}`")]
    AlreadyInitialized { active: String, requested: String },
    /// The blocking worker panicked. `None` when the payload carried no text.
    #[error("{}", worker_message(.0))]
    Worker(Option<String>),
}

fn worker_message(payload: &Option<String>) -> &str {
    payload.as_deref().unwrap_or_default()
}
