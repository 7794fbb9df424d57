use serde::{Deserialize, Serialize};
use std::env;
use std::net::SocketAddr;

/// Process-level settings read from the environment at startup.
///
/// Site-level settings (title, signing secret, installation state) live in
/// the `config` table instead; see [`ConfigCache`](crate::database::ConfigCache).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub http: HttpConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
    /// Largest form body the access gate will read
    pub max_form_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub expiry_hours: u64,
    pub secure_cookie: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let environment = match lookup("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Defaults by environment, then specific overrides
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_overrides(lookup)
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        // Database overrides
        if let Some(v) = lookup("DATABASE_URL") {
            self.database.url = v;
        }
        if let Some(v) = lookup("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }

        // HTTP overrides
        if let Some(v) = lookup("HTTP_HOST") {
            self.http.host = v;
        }
        if let Some(v) = lookup("HTTP_PORT") {
            self.http.port = v.parse().unwrap_or(self.http.port);
        }
        if let Some(v) = lookup("HTTP_MAX_FORM_BYTES") {
            self.http.max_form_bytes = v.parse().unwrap_or(self.http.max_form_bytes);
        }

        // Session overrides
        if let Some(v) = lookup("SESSION_EXPIRY_HOURS") {
            self.session.expiry_hours = v.parse().unwrap_or(self.session.expiry_hours);
        }
        if let Some(v) = lookup("SESSION_SECURE_COOKIE") {
            self.session.secure_cookie = v.parse().unwrap_or(self.session.secure_cookie);
        }

        self
    }

    pub fn bind_address(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.http.host, self.http.port).parse()
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                url: "sqlite://informas.db".to_string(),
                max_connections: 5,
            },
            http: HttpConfig {
                host: "127.0.0.1".to_string(),
                port: 8000,
                max_form_bytes: 1024 * 1024, // 1MB
            },
            session: SessionConfig {
                expiry_hours: 24 * 7, // 1 week
                secure_cookie: false,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                url: "sqlite://data/informas.db".to_string(),
                max_connections: 10,
            },
            http: HttpConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
                max_form_bytes: 256 * 1024,
            },
            session: SessionConfig {
                expiry_hours: 24,
                secure_cookie: true,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                url: "sqlite://data/informas.db".to_string(),
                max_connections: 20,
            },
            http: HttpConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
                max_form_bytes: 64 * 1024,
            },
            session: SessionConfig {
                expiry_hours: 12,
                secure_cookie: true,
            },
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::development()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::from_lookup(lookup(&[]));
        assert_eq!(config.environment, Environment::Development);
        assert!(!config.session.secure_cookie);
        assert_eq!(config.http.port, 8000);
    }

    #[test]
    fn test_production_preset() {
        let config = AppConfig::from_lookup(lookup(&[("APP_ENV", "prod")]));
        assert_eq!(config.environment, Environment::Production);
        assert!(config.session.secure_cookie);
        assert_eq!(config.session.expiry_hours, 12);
    }

    #[test]
    fn test_overrides_apply_on_top_of_preset() {
        let config = AppConfig::from_lookup(lookup(&[
            ("APP_ENV", "staging"),
            ("DATABASE_URL", "sqlite::memory:"),
            ("HTTP_PORT", "9090"),
            ("SESSION_SECURE_COOKIE", "false"),
        ]));
        assert_eq!(config.environment, Environment::Staging);
        assert_eq!(config.database.url, "sqlite::memory:");
        assert_eq!(config.http.port, 9090);
        assert!(!config.session.secure_cookie);
        assert_eq!(config.database.max_connections, 10);
    }

    #[test]
    fn test_unparseable_override_keeps_default() {
        let config = AppConfig::from_lookup(lookup(&[("HTTP_PORT", "eighty")]));
        assert_eq!(config.http.port, 8000);
    }

    #[test]
    fn test_bind_address() {
        let config = AppConfig::development();
        assert_eq!(config.bind_address().unwrap().to_string(), "127.0.0.1:8000");
    }
}
