// ABOUTME: Storage layer for AutoHub built on SQLite
// ABOUTME: Error type, connection pool configuration and embedded migrations

use serde::{Deserialize, Serialize};
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

use autohub_core::ValidationError;

/// Migrations compiled into the binary
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("Sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0} not found")]
    NotFound(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Invalid state: {0}")]
    InvalidState(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Invalid stored data: {0}")]
    InvalidData(String),
}

impl From<ValidationError> for StorageError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::RoleNotAllowed { .. } => StorageError::Forbidden(err.to_string()),
            _ => StorageError::Validation(err.to_string()),
        }
    }
}

impl StorageError {
    /// Map `RowNotFound` to a typed not-found error for the named entity
    pub fn not_found_or(entity: &str) -> impl FnOnce(sqlx::Error) -> StorageError + '_ {
        move |err| match err {
            sqlx::Error::RowNotFound => StorageError::NotFound(entity.to_string()),
            other => StorageError::Sqlx(other),
        }
    }
}

pub type StorageResult<T> = Result<T, StorageError>;

/// True when the error comes from a UNIQUE constraint
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub path: PathBuf,
    pub enable_wal: bool,
    pub max_connections: u32,
    pub busy_timeout_seconds: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: autohub_core::database_file(),
            enable_wal: true,
            max_connections: 10,
            busy_timeout_seconds: 30,
        }
    }
}

impl StorageConfig {
    pub fn with_path(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    pub fn database_url(&self) -> String {
        format!("sqlite:{}", self.path.display())
    }
}

/// Open a pool and apply the connection PRAGMAs
pub async fn connect(config: &StorageConfig) -> StorageResult<SqlitePool> {
    let database_url = config.database_url();
    debug!("Connecting to database: {}", database_url);

    let options = SqliteConnectOptions::from_str(&database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(config.busy_timeout_seconds));

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(30))
        .connect_with(options)
        .await?;

    if config.enable_wal {
        sqlx::query("PRAGMA journal_mode = WAL")
            .execute(&pool)
            .await?;
    }

    sqlx::query("PRAGMA synchronous = NORMAL")
        .execute(&pool)
        .await?;

    info!("Database connection established");
    Ok(pool)
}

/// Create the database directory, connect, and run migrations
pub async fn init_database(config: &StorageConfig) -> StorageResult<SqlitePool> {
    if let Some(parent) = config.path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let pool = connect(config).await?;
    run_migrations(&pool).await?;
    Ok(pool)
}

pub async fn run_migrations(pool: &SqlitePool) -> StorageResult<()> {
    MIGRATOR.run(pool).await?;
    debug!("Database migrations completed");
    Ok(())
}

/// Single-connection in-memory pool with migrations applied (tests and tooling)
pub async fn memory_pool() -> StorageResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;
    run_migrations(&pool).await?;
    Ok(pool)
}

/// Build `?, ?, ?` for an IN clause with `count` bindings
pub fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}
