//! Async recipe store: the shared engine handle and its data access contract.
//!
//! # Responsibility
//! - Own the single SQLite connection shared by every consumer.
//! - Run all storage work on the tokio blocking pool.
//! - Publish a table change counter that live queries listen to.
//!
//! # Invariants
//! - Writes are serialized by the connection mutex.
//! - The change counter moves only after a write that touched at least one
//!   row has committed.
//! - Async entry points must be used from inside a tokio runtime.

mod dao;
mod live;

pub use dao::RecipeDao;
pub use live::{LiveQuery, SubscriptionHandle, SubscriptionScope};

use crate::config::StoreConfig;
use crate::db::{open_db, open_db_in_memory, DbResult};
use crate::repo::recipe_repo::{RepoError, RepoResult, SqliteRecipeRepository};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure of one store operation or subscription.
#[derive(Debug)]
pub enum StoreError {
    /// The engine rejected the statement or returned malformed data.
    Repo(RepoError),
    /// The background job panicked or was aborted.
    Worker(String),
    /// A previous job panicked while holding the connection.
    LockPoisoned,
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::Worker(message) => write!(f, "storage worker failed: {message}"),
            Self::LockPoisoned => write!(f, "storage connection is unusable after a panic"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Worker(_) | Self::LockPoisoned => None,
        }
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

#[derive(Debug)]
struct Engine {
    conn: Mutex<Connection>,
    changes: watch::Sender<u64>,
    subscription_buffer: usize,
}

/// Cheaply cloneable handle to one opened recipe database.
///
/// Clones share the same connection and change counter.
#[derive(Debug, Clone)]
pub struct RecipeDatabase {
    engine: Arc<Engine>,
}

impl RecipeDatabase {
    /// Opens the database described by `config`, creating it if absent.
    ///
    /// # Errors
    /// - Returns `DbError` when the file cannot be opened or migrated.
    pub fn open(config: &StoreConfig) -> DbResult<Self> {
        let conn = if config.in_memory {
            open_db_in_memory()?
        } else {
            open_db(config.database_path())?
        };
        Ok(Self::from_connection(conn, config.subscription_buffer))
    }

    /// Wraps an already bootstrapped connection.
    pub fn from_connection(conn: Connection, subscription_buffer: usize) -> Self {
        let (changes, _) = watch::channel(0);
        Self {
            engine: Arc::new(Engine {
                conn: Mutex::new(conn),
                changes,
                subscription_buffer: subscription_buffer.max(1),
            }),
        }
    }

    /// Returns the data access contract bound to this database.
    pub fn recipe_dao(&self) -> RecipeDao {
        RecipeDao::new(self.clone())
    }

    /// Whether both handles point at the same opened engine.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.engine, &other.engine)
    }

    /// Number of committed row-changing writes since open.
    pub fn change_version(&self) -> u64 {
        *self.engine.changes.borrow()
    }

    pub(crate) fn subscription_buffer(&self) -> usize {
        self.engine.subscription_buffer
    }

    pub(crate) fn changes(&self) -> watch::Receiver<u64> {
        self.engine.changes.subscribe()
    }

    /// Runs `job` against the shared connection on the blocking pool.
    pub(crate) async fn run<T, F>(&self, job: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&SqliteRecipeRepository<'_>) -> RepoResult<T> + Send + 'static,
    {
        let engine = Arc::clone(&self.engine);
        tokio::task::spawn_blocking(move || {
            let conn = engine.conn.lock().map_err(|_| StoreError::LockPoisoned)?;
            let repo = SqliteRecipeRepository::new(&conn);
            job(&repo).map_err(StoreError::from)
        })
        .await
        .map_err(|err| StoreError::Worker(err.to_string()))?
    }

    /// Runs a write job that reports `(value, changed_rows)` and notifies
    /// listeners when rows changed.
    pub(crate) async fn write<T, F>(&self, job: F) -> StoreResult<(T, usize)>
    where
        T: Send + 'static,
        F: FnOnce(&SqliteRecipeRepository<'_>) -> RepoResult<(T, usize)> + Send + 'static,
    {
        let engine = Arc::clone(&self.engine);
        self.run(move |repo| {
            let (value, changed) = job(repo)?;
            if changed > 0 {
                engine.changes.send_modify(|version| *version += 1);
            }
            Ok((value, changed))
        })
        .await
    }
}
