//! Process-scoped shared SQLite connection.
//!
//! # Responsibility
//! - Hold the single connection the gateway talks to.
//! - Run blocking SQLite work off the async executor.
//! - Provide explicit init and shutdown for the process-wide handle.
//!
//! # Invariants
//! - The process-wide handle is initialized at most once per process.
//! - Re-initialization with a different location is rejected.
//! - After shutdown every operation fails with `DbError::Closed`.

use super::{open_db, open_db_in_memory, DbError, DbResult};
use log::{info, warn};
use once_cell::sync::OnceCell;
use rusqlite::Connection;
use std::any::Any;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

/// Location string that selects an in-memory database.
pub const IN_MEMORY_LOCATION: &str = ":memory:";

static SHARED_DB: OnceCell<SharedDb> = OnceCell::new();

/// Cloneable handle over one SQLite connection.
///
/// Clones share the same connection; closing one closes all of them.
#[derive(Clone, Debug)]
pub struct SharedDb {
    location: Arc<str>,
    conn: Arc<Mutex<Option<Connection>>>,
}

impl SharedDb {
    /// Opens (and migrates) a file-backed database.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        let path = path.as_ref();
        let conn = open_db(path)?;
        Ok(Self::from_connection(path.display().to_string(), conn))
    }

    /// Opens (and migrates) a private in-memory database.
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = open_db_in_memory()?;
        Ok(Self::from_connection(IN_MEMORY_LOCATION.to_string(), conn))
    }

    /// Opens `location`, treating [`IN_MEMORY_LOCATION`] as in-memory.
    pub fn open_location(location: &str) -> DbResult<Self> {
        if location == IN_MEMORY_LOCATION {
            Self::open_in_memory()
        } else {
            Self::open(location)
        }
    }

    fn from_connection(location: String, conn: Connection) -> Self {
        Self {
            location: Arc::from(location),
            conn: Arc::new(Mutex::new(Some(conn))),
        }
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn is_closed(&self) -> bool {
        self.conn
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    /// Runs `op` against the connection on the blocking thread pool.
    ///
    /// A panic inside `op` is caught and returned as `DbError::Worker`.
    pub async fn run<T, F>(&self, op: F) -> DbResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> DbResult<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        let joined = tokio::task::spawn_blocking(move || {
            let guard = conn.lock().unwrap_or_else(PoisonError::into_inner);
            match guard.as_ref() {
                Some(conn) => op(conn),
                None => Err(DbError::Closed),
            }
        })
        .await;

        match joined {
            Ok(result) => result,
            Err(err) if err.is_panic() => Err(DbError::Worker(panic_text(err.into_panic()))),
            Err(_) => Err(DbError::Worker(Some("blocking task cancelled".to_string()))),
        }
    }

    /// Closes the underlying connection. Returns `false` if it was already closed.
    pub fn close(&self) -> DbResult<bool> {
        let taken = self
            .conn
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match taken {
            Some(conn) => {
                conn.close().map_err(|(_, err)| DbError::Sqlite(err))?;
                info!(
                    "event=db_close module=db status=ok location={}",
                    self.location
                );
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Initializes the process-wide handle, opening it on first use.
///
/// # Invariants
/// - Repeated calls with the same `location` return the same handle.
/// - Calls with a different `location` fail with `DbError::AlreadyInitialized`.
pub fn init_shared_db(location: &str) -> DbResult<SharedDb> {
    let db = SHARED_DB.get_or_try_init(|| SharedDb::open_location(location))?;
    if db.location() != location {
        return Err(DbError::AlreadyInitialized {
            active: db.location().to_string(),
            requested: location.to_string(),
        });
    }
    Ok(db.clone())
}

/// Returns the process-wide handle if it has been initialized.
pub fn shared_db() -> Option<SharedDb> {
    SHARED_DB.get().cloned()
}

/// Gracefully closes the process-wide handle.
///
/// Returns `false` when nothing was open.
pub fn shutdown_shared_db() -> DbResult<bool> {
    match SHARED_DB.get() {
        Some(db) => db.close(),
        None => {
            warn!("event=db_shutdown module=db status=skipped reason=not_initialized");
            Ok(false)
        }
    }
}

fn panic_text(payload: Box<dyn Any + Send>) -> Option<String> {
    if let Some(message) = payload.downcast_ref::<&str>() {
        Some((*message).to_string())
    } else {
        payload.downcast_ref::<String>().cloned()
    }
}
