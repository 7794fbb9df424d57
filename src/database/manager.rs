use std::str::FromStr;
use std::time::Duration;

use futures::future::BoxFuture;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use thiserror::Error;
use tracing::{info, warn};

use crate::database::schema;
use crate::database::token::Token;

/// Errors from the persistent store
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Invalid database URL: {0}")]
    InvalidDatabaseUrl(String),

    #[error("Invalid config key: {0}")]
    InvalidConfigKey(String),

    #[error("Migration error: {0}")]
    MigrationError(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl DatabaseError {
    /// True when a UNIQUE constraint rejected the statement
    pub fn is_unique_violation(&self) -> bool {
        match self {
            DatabaseError::Sqlx(sqlx::Error::Database(e)) => e.is_unique_violation(),
            _ => false,
        }
    }
}

/// Handle to the SQLite store. Cheap to clone; all clones share one pool.
#[derive(Clone, Debug)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open the store at `url`, creating the file if needed.
    ///
    /// In-memory databases are pinned to a single connection that is never
    /// recycled: every SQLite connection to `:memory:` is its own database.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, DatabaseError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| DatabaseError::InvalidDatabaseUrl(format!("{}: {}", url, e)))?
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(5));

        let pool = if Self::is_in_memory(url) {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new()
                .max_connections(max_connections.max(1))
                .connect_with(options)
                .await?
        };

        info!("Connected to database: {}", url);
        Ok(Self { pool })
    }

    /// Fresh in-memory store with the schema applied
    pub async fn in_memory() -> Result<Self, DatabaseError> {
        let db = Self::connect("sqlite::memory:", 1).await?;
        db.migrate().await?;
        Ok(db)
    }

    fn is_in_memory(url: &str) -> bool {
        url.contains(":memory:") || url.contains("mode=memory")
    }

    /// Apply all schema migrations in one transaction
    pub async fn migrate(&self) -> Result<(), DatabaseError> {
        self.transaction(|t| Box::pin(schema::migrate(t))).await
    }

    /// Token that runs every statement directly against the pool
    pub fn token(&self) -> Token {
        Token::direct(self.pool.clone())
    }

    /// Run `f` inside a transaction.
    ///
    /// Commits when `f` returns `Ok`, rolls back otherwise and hands the
    /// callback's error back unchanged. Config values staged on the token
    /// become visible in their cache only once the commit succeeds.
    pub async fn transaction<F, T, E>(&self, f: F) -> Result<T, E>
    where
        F: for<'t> FnOnce(&'t mut Token) -> BoxFuture<'t, Result<T, E>>,
        E: From<DatabaseError>,
    {
        let tx = self.pool.begin().await.map_err(DatabaseError::from)?;
        let mut token = Token::transaction(tx);

        match f(&mut token).await {
            Ok(value) => {
                token.commit().await.map_err(DatabaseError::from)?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = token.rollback().await {
                    warn!("Failed to roll back transaction: {}", rollback_err);
                }
                Err(err)
            }
        }
    }

    /// Ping the store
    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Close the pool (e.g., on shutdown)
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Closed database pool");
    }
}
