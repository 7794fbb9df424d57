use std::collections::HashMap;
use std::sync::Arc;

use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments};
use sqlx::Transaction;
use tokio::sync::RwLock;

use crate::database::manager::DatabaseError;
use crate::database::token::Token;

/// Keys the console itself relies on
pub mod keys {
    /// Non-zero once installation completed
    pub const INSTALLED: &str = "installed";

    /// Secret used to sign session cookies
    pub const SECRET_KEY: &str = "secret_key";

    /// Title shown on every page
    pub const SITE_TITLE: &str = "site_title";

    pub const DEFAULT_SITE_TITLE: &str = "Informas";
}

/// Longest key the config table accepts
pub const MAX_KEY_LEN: usize = 40;

/// In-memory mirror of the `config` table.
///
/// All values are loaded at startup and read from memory afterwards. Writes
/// go through storage first and reach the map only once they are durable,
/// so readers never see a value that storage does not hold.
#[derive(Clone, Debug, Default)]
pub struct ConfigCache {
    values: Arc<RwLock<HashMap<String, String>>>,
}

impl ConfigCache {
    /// Load every config row. The process cannot run without this.
    pub async fn load(token: &mut Token) -> Result<Self, DatabaseError> {
        let rows: Vec<(String, String)> = token
            .query(sqlx::query_as("SELECT key, value FROM config"))
            .await?;

        tracing::debug!("Loaded {} config entries", rows.len());
        Ok(Self {
            values: Arc::new(RwLock::new(rows.into_iter().collect())),
        })
    }

    /// Value for `key`, or an empty string when unset.
    ///
    /// Only committed values are visible. A `set` made through a transaction
    /// is not returned here until that transaction commits, not even to the
    /// code running inside it; use [`ConfigCache::stored`] there instead.
    pub async fn get(&self, key: &str) -> String {
        self.values.read().await.get(key).cloned().unwrap_or_default()
    }

    /// Integer value for `key`; missing or malformed values read as zero
    pub async fn get_int(&self, key: &str) -> i64 {
        self.get(key).await.parse().unwrap_or(0)
    }

    /// Store `value` for `key` through `token`.
    ///
    /// With a direct token the exclusive lock is held across the storage
    /// write and the cache update. Inside a transaction the value is staged
    /// and published when the transaction commits, or dropped on rollback.
    pub async fn set(&self, token: &mut Token, key: &str, value: &str) -> Result<(), DatabaseError> {
        if key.is_empty() || key.len() > MAX_KEY_LEN {
            return Err(DatabaseError::InvalidConfigKey(key.to_string()));
        }

        if token.in_transaction() {
            token.exec(upsert(key, value)).await?;
            token.stage(self, key, value);
        } else {
            let mut values = self.values.write().await;
            token.exec(upsert(key, value)).await?;
            values.insert(key.to_string(), value.to_string());
        }
        Ok(())
    }

    pub async fn set_int(&self, token: &mut Token, key: &str, value: i64) -> Result<(), DatabaseError> {
        self.set(token, key, &value.to_string()).await
    }

    /// Read `key` straight from storage, bypassing the cache.
    /// Inside a transaction this sees the transaction's own writes.
    pub async fn stored(token: &mut Token, key: &str) -> Result<Option<String>, DatabaseError> {
        let row: Option<(String,)> = token
            .query_row(sqlx::query_as("SELECT value FROM config WHERE key = ?").bind(key))
            .await?;
        Ok(row.map(|(value,)| value))
    }

    fn same_cache(&self, other: &ConfigCache) -> bool {
        Arc::ptr_eq(&self.values, &other.values)
    }
}

fn upsert<'q>(key: &'q str, value: &'q str) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    sqlx::query(
        "INSERT INTO config (key, value) VALUES (?, ?)
         ON CONFLICT (key) DO UPDATE SET value = excluded.value",
    )
    .bind(key)
    .bind(value)
}

/// Config writes made inside a transaction, grouped per cache
#[derive(Default)]
pub(crate) struct StagedWrites {
    groups: Vec<(ConfigCache, Vec<(String, String)>)>,
}

impl StagedWrites {
    pub(crate) fn push(&mut self, cache: &ConfigCache, key: &str, value: &str) {
        let write = (key.to_string(), value.to_string());
        match self.groups.iter_mut().find(|(c, _)| c.same_cache(cache)) {
            Some((_, writes)) => writes.push(write),
            None => self.groups.push((cache.clone(), vec![write])),
        }
    }

    /// Commit `tx` while holding every affected cache exclusively, then
    /// apply the staged writes. Nothing is applied if the commit fails.
    pub(crate) async fn publish_with(self, tx: Transaction<'static, Sqlite>) -> Result<(), sqlx::Error> {
        let mut guards = Vec::with_capacity(self.groups.len());
        for (cache, _) in &self.groups {
            guards.push(cache.values.write().await);
        }

        tx.commit().await?;

        for (guard, (_, writes)) in guards.iter_mut().zip(&self.groups) {
            for (key, value) in writes {
                guard.insert(key.clone(), value.clone());
            }
        }
        Ok(())
    }
}
