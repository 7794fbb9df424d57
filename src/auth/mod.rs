pub mod password;
pub mod session;

use argon2::password_hash::rand_core::{OsRng, RngCore};
use once_cell::sync::Lazy;

use crate::database::models::user::{User, UserLookup};
use crate::database::Database;
use crate::error::AppError;

pub use password::CredentialError;
pub use session::{Session, SessionClaims, SessionError, SessionKeys, SESSION_COOKIE};

/// Verifier checked against when the username is unknown, so that a failed
/// lookup costs as much as a wrong password
static DUMMY_VERIFIER: Lazy<Option<String>> = Lazy::new(|| password::hash_password(&generate_secret()).ok());

/// Check a username/password pair.
///
/// Unknown users, wrong passwords and disabled accounts all fail with the
/// same [`AppError::InvalidCredentials`]; the reason is only logged.
pub async fn login(db: &Database, username: &str, password: &str) -> Result<User, AppError> {
    let user = match User::find(&mut db.token(), UserLookup::Username(username)).await? {
        Some(user) => user,
        None => {
            if let Some(verifier) = DUMMY_VERIFIER.as_deref() {
                let _ = password::verify_password(verifier, password);
            }
            tracing::warn!("Login failed: unknown user '{}'", username);
            return Err(AppError::InvalidCredentials);
        }
    };

    if user.authenticate(password).is_err() {
        tracing::warn!("Login failed: wrong password for '{}'", username);
        return Err(AppError::InvalidCredentials);
    }

    if user.is_disabled {
        tracing::warn!("Login failed: account '{}' is disabled", username);
        return Err(AppError::InvalidCredentials);
    }

    tracing::info!("User '{}' (ID: {}) logged in", user.username, user.id);
    Ok(user)
}

/// 32 random bytes, hex encoded
pub fn generate_secret() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
