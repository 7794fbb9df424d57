//! Password hashing with Argon2id.

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("password hashing failed: {0}")]
    HashingFailed(String),
}

/// Hash `plaintext` with a fresh random salt, returning a PHC string
pub fn hash_password(plaintext: &str) -> Result<String, CredentialError> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map_err(|e| CredentialError::HashingFailed(e.to_string()))?;

    Ok(hash.to_string())
}

/// Check `plaintext` against a stored PHC string.
/// An undecodable verifier is treated the same as a wrong password.
pub fn verify_password(encoded: &str, plaintext: &str) -> Result<(), CredentialError> {
    let parsed = PasswordHash::new(encoded).map_err(|_| CredentialError::InvalidCredentials)?;

    Argon2::default()
        .verify_password(plaintext.as_bytes(), &parsed)
        .map_err(|_| CredentialError::InvalidCredentials)
}
