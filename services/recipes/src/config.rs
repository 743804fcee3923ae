//! Server configuration
//!
//! Loaded with the `config` crate from `RECIPES_*` environment variables on
//! top of built-in defaults. Database and Redis settings keep their own
//! `from_env` constructors in the `common` crate.

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

use crate::session::{DEFAULT_SESSION_COOKIE, DEFAULT_SESSION_TTL_SECONDS, SessionSettings};

/// Where recipes, users and sessions are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// PostgreSQL for recipes and users, Redis for sessions
    Postgres,
    /// Everything in process memory
    Memory,
}

impl StorageBackend {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "postgres" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => Err(ConfigError::Message(format!(
                "RECIPES_STORAGE must be `postgres` or `memory`, got `{other}`"
            ))),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawServerConfig {
    host: String,
    port: u16,
    session_ttl_seconds: u64,
    session_cookie: String,
    secure_cookie: bool,
    storage: String,
}

/// HTTP server and session settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub session_ttl_seconds: u64,
    pub session_cookie: String,
    pub secure_cookie: bool,
    pub storage: StorageBackend,
}

impl ServerConfig {
    /// Create a new ServerConfig from environment variables
    ///
    /// # Environment Variables
    /// - `RECIPES_HOST`: bind address (default: "0.0.0.0")
    /// - `RECIPES_PORT`: bind port (default: 3000)
    /// - `RECIPES_SESSION_TTL_SECONDS`: session lifetime (default: 864000)
    /// - `RECIPES_SESSION_COOKIE`: session cookie name (default: "recipes.sid")
    /// - `RECIPES_SECURE_COOKIE`: mark the session cookie `Secure` (default: false)
    /// - `RECIPES_STORAGE`: `postgres` or `memory` (default: "postgres")
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw: RawServerConfig = Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", 3000_i64)?
            .set_default("session_ttl_seconds", DEFAULT_SESSION_TTL_SECONDS as i64)?
            .set_default("session_cookie", DEFAULT_SESSION_COOKIE)?
            .set_default("secure_cookie", false)?
            .set_default("storage", "postgres")?
            .add_source(Environment::with_prefix("RECIPES").try_parsing(true))
            .build()?
            .try_deserialize()?;

        if raw.session_ttl_seconds == 0 {
            return Err(ConfigError::Message(
                "RECIPES_SESSION_TTL_SECONDS must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            host: raw.host,
            port: raw.port,
            session_ttl_seconds: raw.session_ttl_seconds,
            session_cookie: raw.session_cookie,
            secure_cookie: raw.secure_cookie,
            storage: StorageBackend::parse(&raw.storage)?,
        })
    }

    /// Cookie and lifetime settings for the session layer
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            cookie_name: self.session_cookie.clone(),
            ttl_seconds: self.session_ttl_seconds,
            secure: self.secure_cookie,
        }
    }

    /// Address the listener binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
