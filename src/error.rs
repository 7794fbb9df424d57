use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::auth::{CredentialError, SessionError};
use crate::database::DatabaseError;

/// Failures surfaced by page handlers
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad user input; the message is shown as-is
    #[error("{0}")]
    Invalid(String),

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

impl AppError {
    pub fn invalid(message: impl Into<String>) -> Self {
        AppError::Invalid(message.into())
    }

    /// Text for a danger alert. Internal failures are logged and replaced by
    /// a generic message.
    pub fn alert_message(&self) -> String {
        match self {
            AppError::Invalid(msg) => msg.clone(),
            AppError::InvalidCredentials | AppError::Credential(CredentialError::InvalidCredentials) => {
                "invalid credentials".to_string()
            }
            AppError::Credential(e) => {
                tracing::error!("Credential error: {}", e);
                "unable to set password".to_string()
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                "a database error occurred".to_string()
            }
            AppError::Session(e) => {
                tracing::error!("Session error: {}", e);
                "unable to update session".to_string()
            }
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(DatabaseError::from(err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = self.alert_message();
        let status = match self {
            AppError::Invalid(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, message).into_response()
    }
}
