use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tower_cookies::cookie::SameSite;
use tower_cookies::{Cookie, Cookies};

use crate::alert::Alert;
use crate::config::SessionConfig;

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "informas";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session secret is empty")]
    InvalidSecret,

    #[error("Session signing failed: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

/// Everything the client holds between requests
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionClaims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alerts: Vec<Alert>,
    pub exp: i64,
    pub iat: i64,
}

impl SessionClaims {
    fn is_empty(&self) -> bool {
        self.user_id.is_none() && self.alerts.is_empty()
    }
}

/// Signing material and cookie policy for sessions
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    expiry_hours: u64,
    secure: bool,
}

impl SessionKeys {
    pub fn new(secret: &str, settings: &SessionConfig) -> Result<Self, SessionError> {
        if secret.is_empty() {
            return Err(SessionError::InvalidSecret);
        }

        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
            expiry_hours: settings.expiry_hours,
            secure: settings.secure_cookie,
        })
    }

    /// Stamp fresh `iat`/`exp` values and sign
    pub fn encode(&self, claims: &mut SessionClaims) -> Result<String, SessionError> {
        let now = Utc::now();
        claims.iat = now.timestamp();
        claims.exp = (now + Duration::hours(self.expiry_hours as i64)).timestamp();
        Ok(encode(&Header::new(Algorithm::HS256), claims, &self.encoding)?)
    }

    /// Verify a token. Tampered, expired or malformed tokens yield `None`.
    pub fn decode(&self, token: &str) -> Option<SessionClaims> {
        match decode::<SessionClaims>(token, &self.decoding, &self.validation) {
            Ok(data) => Some(data.claims),
            Err(e) => {
                tracing::debug!("Discarding session cookie: {}", e);
                None
            }
        }
    }
}

/// Cookie-backed session for the current request.
///
/// Every mutation re-signs the cookie straight away, so changes made by a
/// handler that later redirects still reach the client.
#[derive(Clone)]
pub struct Session {
    cookies: Cookies,
    keys: Arc<SessionKeys>,
}

impl Session {
    pub fn new(cookies: Cookies, keys: Arc<SessionKeys>) -> Self {
        Self { cookies, keys }
    }

    /// Current claims; an absent or invalid cookie is an empty session
    pub fn claims(&self) -> SessionClaims {
        self.cookies
            .get(SESSION_COOKIE)
            .and_then(|cookie| self.keys.decode(cookie.value()))
            .unwrap_or_default()
    }

    pub fn user_id(&self) -> Option<i64> {
        self.claims().user_id
    }

    pub fn set_user_id(&self, user_id: i64) -> Result<(), SessionError> {
        self.update(|claims| claims.user_id = Some(user_id))
    }

    pub fn clear_user_id(&self) -> Result<(), SessionError> {
        self.update(|claims| claims.user_id = None)
    }

    /// Read-modify-write the claims and store the result in the cookie jar
    pub(crate) fn update<R>(&self, f: impl FnOnce(&mut SessionClaims) -> R) -> Result<R, SessionError> {
        let mut claims = self.claims();
        let result = f(&mut claims);
        self.store(claims)?;
        Ok(result)
    }

    fn store(&self, mut claims: SessionClaims) -> Result<(), SessionError> {
        if claims.is_empty() {
            self.cookies.remove(Cookie::build(SESSION_COOKIE).path("/").build());
            return Ok(());
        }

        let token = self.keys.encode(&mut claims)?;
        let cookie = Cookie::build((SESSION_COOKIE, token))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.keys.secure)
            .build();
        self.cookies.add(cookie);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::AlertKind;

    fn keys(secret: &str) -> SessionKeys {
        SessionKeys::new(
            secret,
            &SessionConfig {
                expiry_hours: 1,
                secure_cookie: false,
            },
        )
        .unwrap()
    }

    #[test]
    fn signed_claims_round_trip() {
        let keys = keys("secret");
        let mut claims = SessionClaims {
            user_id: Some(7),
            alerts: vec![Alert::new(AlertKind::Info, "hello")],
            ..SessionClaims::default()
        };

        let token = keys.encode(&mut claims).unwrap();
        assert!(claims.exp > claims.iat);
        assert_eq!(keys.decode(&token), Some(claims));
    }

    #[test]
    fn foreign_signatures_are_rejected() {
        let mut claims = SessionClaims {
            user_id: Some(1),
            ..SessionClaims::default()
        };
        let token = keys("one").encode(&mut claims).unwrap();

        assert_eq!(keys("two").decode(&token), None);
        assert_eq!(keys("one").decode("garbage"), None);
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let keys = keys("secret");
        let claims = SessionClaims {
            user_id: Some(1),
            alerts: Vec::new(),
            iat: 0,
            exp: Utc::now().timestamp() - 3600,
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding).unwrap();

        assert_eq!(keys.decode(&token), None);
    }

    #[test]
    fn empty_secret_is_refused() {
        let result = SessionKeys::new(
            "",
            &SessionConfig {
                expiry_hours: 1,
                secure_cookie: false,
            },
        );
        assert!(matches!(result, Err(SessionError::InvalidSecret)));
    }
}
