//! Database layer (SQLite via sqlx).
//!
//! One file per entity; every operation is a method on [`Database`] and
//! signals expected failures through [`StoreError`] so handlers can match
//! on them.

pub mod accessories;
pub mod assignments;
pub mod athletes;
pub mod equipment;
pub mod exercises;
pub mod programs;
pub mod seed;
pub mod users;
pub mod workouts;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;

/// Expected outcomes of data-access calls other than success.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("a record with that name already exists")]
    DuplicateName,

    #[error("username is already taken")]
    DuplicateUsername,

    #[error("record is still referenced")]
    InUse,

    #[error("exercise is already assigned to this athlete")]
    AlreadyAssigned,

    #[error("athlete already has an active program")]
    AlreadyActive,

    #[error("program template is assigned to an athlete")]
    TemplateInUse,

    #[error("athlete is already at the highest tier")]
    AlreadyAtMaxTier,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("invalid seed catalog: {0}")]
    Seed(#[from] serde_json::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// True when `err` is a UNIQUE constraint violation.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

/// True when `err` is a FOREIGN KEY constraint violation.
pub(crate) fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_foreign_key_violation())
}

/// Map a unique violation to `on_unique`, anything else to `Database`.
pub(crate) fn map_unique(err: sqlx::Error, on_unique: StoreError) -> StoreError {
    if is_unique_violation(&err) {
        on_unique
    } else {
        StoreError::Database(err)
    }
}

/// Process-wide database handle.
///
/// The pool holds exactly one connection: SQLite allows a single writer,
/// and lock contention is left to the driver's busy timeout.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open the database at `database_url`, creating the file if needed.
    ///
    /// Migrations are not run here; call [`Database::migrate`] at startup.
    pub async fn connect(database_url: &str, busy_timeout: Duration) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(busy_timeout);

        // In-memory databases vanish with their connection, so never let
        // the pool recycle it.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        tracing::info!(url = database_url, "Connected to SQLite");

        Ok(Self { pool })
    }

    /// Open, migrate and seed in one go. Used by `main` and the tests.
    pub async fn open(database_url: &str, busy_timeout: Duration) -> StoreResult<Self> {
        let db = Self::connect(database_url, busy_timeout).await?;
        db.migrate().await?;
        db.seed_catalog(seed::DEFAULT_CATALOG).await?;
        Ok(db)
    }

    /// Apply pending migrations embedded from `migrations/`.
    pub async fn migrate(&self) -> StoreResult<()> {
        tracing::info!("Running database migrations");
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        tracing::info!("Database migrations complete");
        Ok(())
    }
}
