use std::path::{Path, PathBuf};
use std::time::Duration;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, OptionalExtension, Transaction, TransactionBehavior};
use tracing::{info, warn};

use super::schema;
use crate::{Error, Result};

type ConnectionPool = Pool<SqliteConnectionManager>;

/// Settings for opening the store.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Path of the SQLite file. Parent directories are created on open.
    pub path: PathBuf,
    /// Maximum number of pooled connections.
    pub pool_size: u32,
    /// Busy timeout applied to every connection, in milliseconds.
    pub busy_timeout_ms: u32,
    /// How long a caller waits for a free connection.
    pub connection_timeout: Duration,
}

impl DatabaseConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            pool_size: 8,
            busy_timeout_ms: 5_000,
            connection_timeout: Duration::from_secs(5),
        }
    }

    pub fn with_pool_size(mut self, pool_size: u32) -> Self {
        self.pool_size = pool_size.max(1);
        self
    }
}

#[derive(Debug)]
struct PragmaCustomizer {
    busy_timeout_ms: u32,
}

impl r2d2::CustomizeConnection<Connection, rusqlite::Error> for PragmaCustomizer {
    fn on_acquire(&self, conn: &mut Connection) -> std::result::Result<(), rusqlite::Error> {
        conn.execute_batch(&format!(
            "PRAGMA busy_timeout = {};\
             PRAGMA journal_mode = WAL;\
             PRAGMA foreign_keys = ON;\
             PRAGMA synchronous = NORMAL;",
            self.busy_timeout_ms
        ))
    }
}

/// Pooled SQLite connection factory shared by the repositories.
#[derive(Clone)]
pub struct Database {
    pool: ConnectionPool,
    path: PathBuf,
}

impl Database {
    /// Open (or create) the store and apply the schema.
    pub fn open(config: &DatabaseConfig) -> Result<Self> {
        if let Some(parent) = config.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|err| {
                    Error::Storage(format!("Failed to create database directory: {}", err))
                })?;
            }
        }

        let manager = SqliteConnectionManager::file(&config.path);
        let pool = Pool::builder()
            .max_size(config.pool_size)
            .connection_timeout(config.connection_timeout)
            .connection_customizer(Box::new(PragmaCustomizer {
                busy_timeout_ms: config.busy_timeout_ms,
            }))
            .build(manager)?;

        let conn = pool.get()?;
        apply_schema(&conn)?;
        drop(conn);

        info!(path = %config.path.display(), "database opened");

        Ok(Self {
            pool,
            path: config.path.clone(),
        })
    }

    /// Open the store, retrying a bounded number of times with a fixed delay.
    pub async fn open_with_retry(
        config: &DatabaseConfig,
        attempts: u32,
        delay: Duration,
    ) -> Result<Self> {
        let attempts = attempts.max(1);
        let mut attempt = 1;
        loop {
            let cfg = config.clone();
            match tokio::task::spawn_blocking(move || Database::open(&cfg)).await? {
                Ok(db) => return Ok(db),
                Err(err) if attempt < attempts => {
                    warn!(attempt, attempts, error = %err, "database open failed, retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run a write unit of work inside one `IMMEDIATE` transaction.
    ///
    /// The write lock is taken up front so read-then-write sequences (the
    /// first-admin check, reference checks) see a stable table. The
    /// transaction commits when `f` returns `Ok` and rolls back otherwise.
    pub async fn transact<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        self.run(TransactionBehavior::Immediate, f).await
    }

    /// Run a read-only unit of work inside one deferred transaction.
    pub async fn read<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        self.run(TransactionBehavior::Deferred, f).await
    }

    async fn run<F, T>(&self, behavior: TransactionBehavior, f: F) -> Result<T>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            let tx = conn.transaction_with_behavior(behavior)?;
            let value = f(&tx)?;
            tx.commit()?;
            Ok(value)
        })
        .await?
    }
}

fn apply_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(schema::CREATE_TABLES)
        .map_err(|err| Error::Storage(format!("schema: {}", err)))?;

    let version: Option<u32> = conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
            row.get(0)
        })
        .optional()?;

    if version.is_none() {
        conn.execute(
            "INSERT INTO schema_version (version) VALUES (?1)",
            [schema::SCHEMA_VERSION],
        )?;
    }
    Ok(())
}

/// Constraint class of a failed write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ConstraintViolation {
    Unique,
    ForeignKey,
}

pub(crate) fn constraint_violation(err: &rusqlite::Error) -> Option<ConstraintViolation> {
    match err {
        rusqlite::Error::SqliteFailure(failure, _) => match failure.extended_code {
            rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE => Some(ConstraintViolation::Unique),
            rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY => Some(ConstraintViolation::ForeignKey),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn open_temp() -> (Database, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let config = DatabaseConfig::new(temp_dir.path().join("data").join("flow.db"));
        (Database::open(&config).unwrap(), temp_dir)
    }

    #[tokio::test]
    async fn open_creates_tables_and_version() {
        let (db, _tmp) = open_temp();
        assert!(db.path().exists());

        let (tables, version) = db
            .transact(|tx| {
                let mut stmt =
                    tx.prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")?;
                let tables = stmt
                    .query_map([], |row| row.get::<_, String>(0))?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                let version: u32 =
                    tx.query_row("SELECT version FROM schema_version", [], |row| row.get(0))?;
                Ok((tables, version))
            })
            .await
            .unwrap();

        assert!(tables.contains(&"employees".to_string()));
        assert!(tables.contains(&"tasks".to_string()));
        assert_eq!(version, schema::SCHEMA_VERSION);
    }

    #[tokio::test]
    async fn reopening_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let config = DatabaseConfig::new(temp_dir.path().join("flow.db"));
        let first = Database::open(&config).unwrap();
        drop(first);
        let second = Database::open(&config).unwrap();

        let rows: i64 = second
            .transact(|tx| {
                Ok(tx.query_row("SELECT COUNT(*) FROM schema_version", [], |row| row.get(0))?)
            })
            .await
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[tokio::test]
    async fn foreign_keys_enabled_on_every_connection() {
        let (db, _tmp) = open_temp();
        let enabled: i32 = db
            .read(|tx| Ok(tx.query_row("PRAGMA foreign_keys", [], |row| row.get(0))?))
            .await
            .unwrap();
        assert_eq!(enabled, 1);
    }

    #[tokio::test]
    async fn failed_transaction_rolls_back() {
        let (db, _tmp) = open_temp();
        let result: Result<()> = db
            .transact(|tx| {
                tx.execute(
                    "INSERT INTO employees (name, title, email) VALUES ('A', 'Dev', 'a@x.com')",
                    [],
                )?;
                Err(Error::InvalidInput("abort".to_string()))
            })
            .await;
        assert!(result.is_err());

        let count: i64 = db
            .read(|tx| Ok(tx.query_row("SELECT COUNT(*) FROM employees", [], |row| row.get(0))?))
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn open_with_retry_gives_up_after_attempts() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"file").unwrap();
        let config = DatabaseConfig::new(blocker.join("flow.db"));

        let result = Database::open_with_retry(&config, 2, Duration::from_millis(1)).await;
        assert!(matches!(result, Err(Error::Storage(_))));
    }
}
