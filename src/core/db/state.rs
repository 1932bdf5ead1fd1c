use anyhow::Context;
use sqlx::{
    Sqlite, Transaction,
    pool::PoolConnection,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous},
};
use tokio::sync::{RwLock, RwLockReadGuard};

use std::{
    ops::{Deref, DerefMut},
    path::{Path, PathBuf},
    str::FromStr,
};

pub(super) struct StoreState {
    db_file: PathBuf,
    pool: RwLock<SqlitePool>,
}

impl std::fmt::Debug for StoreState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreState")
            .field("db_file", &self.db_file)
            .finish()
    }
}

impl StoreState {
    pub(super) async fn open<P: AsRef<Path>>(db_file: P, max_connections: u32) -> anyhow::Result<Self> {
        let db_file = db_file.as_ref().to_path_buf();

        if !db_file.parent().map(|p| p.as_os_str().is_empty() || p.is_dir()).unwrap_or(true) {
            anyhow::bail!("Database directory does not exist: {:?}", db_file);
        }

        let connect_opts = SqliteConnectOptions::new()
            .filename(&db_file)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true);

        let pool_opts = SqlitePoolOptions::new().max_connections(max_connections);
        let state = Self::connect(db_file, connect_opts, pool_opts).await?;
        tracing::debug!(db_file = ?state.db_file, max_connections, "booking store opened");
        Ok(state)
    }

    /// A private database that lives as long as its single pooled connection.
    pub(super) async fn open_in_memory() -> anyhow::Result<Self> {
        let connect_opts = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        // Every new connection would see a fresh empty database, so the one
        // connection is kept open for the life of the pool.
        let pool_opts = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);

        let state = Self::connect(PathBuf::from(":memory:"), connect_opts, pool_opts).await?;
        tracing::debug!("in-memory booking store opened");
        Ok(state)
    }

    async fn connect(
        db_file: PathBuf,
        connect_opts: SqliteConnectOptions,
        pool_opts: SqlitePoolOptions,
    ) -> anyhow::Result<Self> {
        let pool = pool_opts
            .connect_with(connect_opts)
            .await
            .with_context(|| format!("Failed to open booking database {:?}", db_file))?;
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("Failed to apply booking database migrations")?;

        Ok(Self {
            db_file,
            pool: RwLock::new(pool),
        })
    }

    /// Acquire a pooled connection and hold the pool read lock for the entire lifetime
    /// of the returned guard.
    pub(super) async fn conn(&self) -> anyhow::Result<DbConnGuard<'_>> {
        let pool_guard = self.pool.read().await;

        // The connection must be acquired while the read lock is held so that
        // `close` cannot run underneath it.
        let conn = pool_guard.acquire().await?;

        Ok(DbConnGuard {
            _pool_guard: pool_guard,
            conn,
        })
    }

    /// Waits for in-flight queries, checkpoints the WAL and closes the pool.
    pub(super) async fn close(&self) -> anyhow::Result<()> {
        let pool_guard = self.pool.write().await;

        sqlx::query("PRAGMA wal_checkpoint(TRUNCATE);")
            .execute(&*pool_guard)
            .await?;

        pool_guard.close().await;
        tracing::debug!(db_file = ?self.db_file, "booking store closed");
        Ok(())
    }
}

pub struct DbConnGuard<'a> {
    _pool_guard: RwLockReadGuard<'a, SqlitePool>,
    conn: PoolConnection<Sqlite>,
}

impl<'a> Deref for DbConnGuard<'a> {
    type Target = PoolConnection<Sqlite>;
    fn deref(&self) -> &Self::Target {
        &self.conn
    }
}

impl<'a> DerefMut for DbConnGuard<'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.conn
    }
}

impl<'a> DbConnGuard<'a> {
    pub(super) async fn begin_transaction(&mut self) -> anyhow::Result<Transaction<'_, Sqlite>> {
        use sqlx::Connection;
        Ok(self.conn.begin().await?)
    }
}
