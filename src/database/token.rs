use sqlx::query::{Query, QueryAs};
use sqlx::sqlite::{Sqlite, SqliteArguments, SqlitePool, SqliteQueryResult, SqliteRow};
use sqlx::{FromRow, Transaction};

use crate::database::config_cache::{ConfigCache, StagedWrites};

enum Conn {
    Direct(SqlitePool),
    Transaction(Transaction<'static, Sqlite>),
}

/// Execution token: lets data-access code run the same statements either
/// directly against the pool or inside an open transaction.
///
/// Tokens are created by [`Database::token`](crate::database::Database::token)
/// and [`Database::transaction`](crate::database::Database::transaction);
/// only the latter can commit.
pub struct Token {
    conn: Conn,
    staged: StagedWrites,
}

impl Token {
    pub(crate) fn direct(pool: SqlitePool) -> Self {
        Self {
            conn: Conn::Direct(pool),
            staged: StagedWrites::default(),
        }
    }

    pub(crate) fn transaction(tx: Transaction<'static, Sqlite>) -> Self {
        Self {
            conn: Conn::Transaction(tx),
            staged: StagedWrites::default(),
        }
    }

    /// True when statements are staged in an open transaction
    pub fn in_transaction(&self) -> bool {
        matches!(self.conn, Conn::Transaction(_))
    }

    /// Fetch all rows
    pub async fn query<'q, O>(
        &mut self,
        query: QueryAs<'q, Sqlite, O, SqliteArguments<'q>>,
    ) -> Result<Vec<O>, sqlx::Error>
    where
        O: Send + Unpin + for<'r> FromRow<'r, SqliteRow>,
    {
        match &mut self.conn {
            Conn::Direct(pool) => query.fetch_all(&*pool).await,
            Conn::Transaction(tx) => query.fetch_all(&mut **tx).await,
        }
    }

    /// Fetch at most one row
    pub async fn query_row<'q, O>(
        &mut self,
        query: QueryAs<'q, Sqlite, O, SqliteArguments<'q>>,
    ) -> Result<Option<O>, sqlx::Error>
    where
        O: Send + Unpin + for<'r> FromRow<'r, SqliteRow>,
    {
        match &mut self.conn {
            Conn::Direct(pool) => query.fetch_optional(&*pool).await,
            Conn::Transaction(tx) => query.fetch_optional(&mut **tx).await,
        }
    }

    /// Execute a statement and report affected rows
    pub async fn exec<'q>(
        &mut self,
        query: Query<'q, Sqlite, SqliteArguments<'q>>,
    ) -> Result<SqliteQueryResult, sqlx::Error> {
        match &mut self.conn {
            Conn::Direct(pool) => query.execute(&*pool).await,
            Conn::Transaction(tx) => query.execute(&mut **tx).await,
        }
    }

    /// Remember a config write to publish once the transaction commits
    pub(crate) fn stage(&mut self, cache: &ConfigCache, key: &str, value: &str) {
        self.staged.push(cache, key, value);
    }

    /// Commit the transaction and publish staged config writes.
    /// A direct token has nothing to commit.
    pub(crate) async fn commit(self) -> Result<(), sqlx::Error> {
        match self.conn {
            Conn::Direct(_) => Ok(()),
            Conn::Transaction(tx) => self.staged.publish_with(tx).await,
        }
    }

    /// Roll back the transaction, discarding staged config writes
    pub(crate) async fn rollback(self) -> Result<(), sqlx::Error> {
        match self.conn {
            Conn::Direct(_) => Ok(()),
            Conn::Transaction(tx) => tx.rollback().await,
        }
    }
}
