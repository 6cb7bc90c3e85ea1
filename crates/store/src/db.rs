//! Database connection and pool management.

use exhibit_config::DatabaseConfig;
use exn::ResultExt;
use sqlx::SqliteConnection;
use sqlx::pool::PoolConnectionMetadata;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous};
use std::time::Duration;
use tracing::instrument;

use crate::error::{ErrorKind, Result};

/// Embedded migrations that are run automatically on connect.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(3);
const BUSY_TIMEOUT: Duration = Duration::from_millis(1500);

/// Database connection pool for the versioned content store.
///
/// The pool is the "give me a usable database handle" capability that
/// [`Resolver`](crate::Resolver) draws from: one connection per lookup,
/// returned as soon as the lookup finishes.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    async fn new(options: SqliteConnectOptions, max: u32, acquire_timeout: Duration, migrate: bool) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            // Applies the query-based PRAGMAs to EVERY connection the pool
            // opens, not only the first one.
            .after_connect(|conn, meta| Box::pin(async move { Self::apply_pragmas(conn, meta).await }))
            .max_connections(max)
            .acquire_timeout(acquire_timeout)
            .connect_with(options)
            .await
            .or_raise(|| ErrorKind::Connection)?;
        let db = Self { pool };
        if migrate {
            db.migrate().await?;
        }
        Ok(db)
    }

    /// Connect using the `database` section of the configuration.
    ///
    /// Creates the database file and its parent directories if they don't
    /// exist, then runs migrations. In read-only mode the file must already
    /// exist, and migrations are left to whoever owns the write path.
    pub async fn connect_with(config: &DatabaseConfig) -> Result<Self> {
        let options = match config.read_only {
            true => SqliteConnectOptions::new()
                .filename(&config.path)
                .read_only(true)
                .busy_timeout(config.busy_timeout()),
            false => {
                if let Some(parent) = config.path.parent() {
                    std::fs::create_dir_all(parent).or_raise(|| ErrorKind::Connection)?;
                }
                Self::base_options(config.busy_timeout())
                    .filename(&config.path)
                    .create_if_missing(true)
            }
        };
        Self::new(options, config.max_connections, config.acquire_timeout(), !config.read_only).await
    }

    /// Connect to an in-memory database (useful for testing).
    ///
    /// Note:
    /// - In-memory databases are destroyed when the connection closes.
    /// - Do NOT apply `#[cfg(test)]` so that other crates can also use this in their tests.
    pub async fn connect_in_memory() -> Result<Self> {
        let options = Self::base_options(BUSY_TIMEOUT).filename(":memory:");
        // In-memory database must either use the same cache `.shared_cache(true)`,
        // or be limited to one connection. Otherwise parallel connections will
        // see different databases that contain different data.
        Self::new(options, 1, ACQUIRE_TIMEOUT, true).await
    }

    /// Base connection options shared between file and in-memory databases.
    fn base_options(busy_timeout: Duration) -> SqliteConnectOptions {
        SqliteConnectOptions::new()
            // WAL lets lookups keep reading while the write path commits.
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(busy_timeout)
    }

    /// Apply additional PRAGMA settings that aren't exposed via SqliteConnectOptions.
    async fn apply_pragmas(conn: &mut SqliteConnection, _meta: PoolConnectionMetadata) -> sqlx::Result<()> {
        sqlx::query(
            r#"
                PRAGMA cache_size = -8192;
                PRAGMA temp_store = MEMORY;
                PRAGMA mmap_size = 33554432;
            "#,
        )
        .execute(conn)
        .await?;
        Ok(())
    }

    /// Run database migrations.
    #[instrument("performing database migrations", skip(self))]
    async fn migrate(&self) -> Result<()> {
        MIGRATOR.run(&self.pool).await.or_raise(|| ErrorKind::Migration)
    }

    /// Get a reference to the underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection pool.
    ///
    /// Waits for all connections to be returned to the pool and then closes
    /// them. After calling this, the Database instance should not be used.
    pub async fn close(&self) {
        // Let SQLite update query planner statistics
        _ = sqlx::query("PRAGMA optimize").execute(&self.pool).await;
        self.pool.close().await;
    }
}
