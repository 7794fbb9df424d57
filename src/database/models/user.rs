use serde::Serialize;
use sqlx::FromRow;

use crate::auth::password::{self, CredentialError};
use crate::database::manager::DatabaseError;
use crate::database::token::Token;

/// Registered console account
#[derive(Debug, Clone, Default, PartialEq, Serialize, FromRow)]
pub struct User {
    /// Zero until the row is first saved
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub email: String,
    pub is_admin: bool,
    pub is_disabled: bool,
}

/// Fields a user can be looked up by
#[derive(Debug, Clone, Copy)]
pub enum UserLookup<'a> {
    Id(i64),
    Username(&'a str),
}

const SELECT_BY_ID: &str = r#"
    SELECT id, username, password, email, is_admin, is_disabled
    FROM users WHERE id = ?
"#;

const SELECT_BY_USERNAME: &str = r#"
    SELECT id, username, password, email, is_admin, is_disabled
    FROM users WHERE username = ?
"#;

impl User {
    pub async fn find(token: &mut Token, lookup: UserLookup<'_>) -> Result<Option<User>, DatabaseError> {
        let user = match lookup {
            UserLookup::Id(id) => token.query_row(sqlx::query_as(SELECT_BY_ID).bind(id)).await?,
            UserLookup::Username(username) => {
                token
                    .query_row(sqlx::query_as(SELECT_BY_USERNAME).bind(username))
                    .await?
            }
        };
        Ok(user)
    }

    /// Every account, ordered by username
    pub async fn all(token: &mut Token) -> Result<Vec<User>, DatabaseError> {
        let users = token
            .query(sqlx::query_as(
                "SELECT id, username, password, email, is_admin, is_disabled FROM users ORDER BY username",
            ))
            .await?;
        Ok(users)
    }

    /// Insert the user when it has no id yet, otherwise update it in place
    pub async fn save(&mut self, token: &mut Token) -> Result<(), DatabaseError> {
        if self.id == 0 {
            let result = token
                .exec(
                    sqlx::query(
                        r#"
                        INSERT INTO users (username, password, email, is_admin, is_disabled)
                        VALUES (?, ?, ?, ?, ?)
                        "#,
                    )
                    .bind(&self.username)
                    .bind(&self.password)
                    .bind(&self.email)
                    .bind(self.is_admin)
                    .bind(self.is_disabled),
                )
                .await?;
            self.id = result.last_insert_rowid();
        } else {
            token
                .exec(
                    sqlx::query(
                        r#"
                        UPDATE users
                        SET username = ?, password = ?, email = ?, is_admin = ?, is_disabled = ?
                        WHERE id = ?
                        "#,
                    )
                    .bind(&self.username)
                    .bind(&self.password)
                    .bind(&self.email)
                    .bind(self.is_admin)
                    .bind(self.is_disabled)
                    .bind(self.id),
                )
                .await?;
        }
        Ok(())
    }

    /// Permanently remove the account. Returns false if it was already gone.
    pub async fn delete(&self, token: &mut Token) -> Result<bool, DatabaseError> {
        let result = token
            .exec(sqlx::query("DELETE FROM users WHERE id = ?").bind(self.id))
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Replace the stored verifier. Does not touch the database; call `save`.
    pub fn set_password(&mut self, plaintext: &str) -> Result<(), CredentialError> {
        self.password = password::hash_password(plaintext)?;
        Ok(())
    }

    pub fn authenticate(&self, plaintext: &str) -> Result<(), CredentialError> {
        password::verify_password(&self.password, plaintext)
    }
}
