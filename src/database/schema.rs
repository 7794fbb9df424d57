use crate::database::manager::DatabaseError;
use crate::database::token::Token;

const MIGRATIONS: &[(&str, &str)] = &[
    (
        "config",
        r#"
        CREATE TABLE IF NOT EXISTS config (
            key   TEXT PRIMARY KEY CHECK (length(key) <= 40),
            value TEXT NOT NULL
        )
        "#,
    ),
    (
        "users",
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            username    TEXT NOT NULL UNIQUE,
            password    TEXT NOT NULL,
            email       TEXT NOT NULL,
            is_admin    BOOLEAN NOT NULL DEFAULT 0,
            is_disabled BOOLEAN NOT NULL DEFAULT 0
        )
        "#,
    ),
];

/// Create every table the console needs. Safe to run repeatedly.
pub async fn migrate(token: &mut Token) -> Result<(), DatabaseError> {
    for (table, ddl) in MIGRATIONS {
        token
            .exec(sqlx::query(ddl))
            .await
            .map_err(|e| DatabaseError::MigrationError(format!("{}: {}", table, e)))?;
        tracing::debug!("Migrated table {}", table);
    }
    Ok(())
}
