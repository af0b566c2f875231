// Process configuration loaded once at startup
// Token settings are mandatory; a malformed value must stop the process before it binds

use crate::auth::token::SigningContext;
use std::collections::HashMap;

/// Configuration errors detected while loading settings
/// All of these are fatal: the server must not start with them
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),

    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

pub const TOKEN_AUDIENCE: &str = "TOKEN_AUDIENCE";
pub const TOKEN_ISSUER: &str = "TOKEN_ISSUER";
pub const TOKEN_HMAC_SECRET_KEY: &str = "TOKEN_HMAC_SECRET_KEY";
pub const TOKEN_EXPIRE_IN_DAYS: &str = "TOKEN_EXPIRE_IN_DAYS";
pub const TOKEN_LEEWAY_SECONDS: &str = "TOKEN_LEEWAY_SECONDS";

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: String,
    /// PostgreSQL connection string; the in-memory identity store is used when absent
    pub database_url: Option<String>,
    pub signing: SigningContext,
}

impl AppConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_source<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| -> Result<String, ConfigError> {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        let audience = required(TOKEN_AUDIENCE)?;
        let issuer = required(TOKEN_ISSUER)?;
        let secret = required(TOKEN_HMAC_SECRET_KEY)?;
        let expire_in_days = required(TOKEN_EXPIRE_IN_DAYS)?;
        let leeway_seconds = match lookup(TOKEN_LEEWAY_SECONDS) {
            Some(raw) => raw.trim().parse::<u64>().map_err(|e| ConfigError::Invalid {
                key: TOKEN_LEEWAY_SECONDS,
                reason: e.to_string(),
            })?,
            None => 0,
        };

        let signing = SigningContext::from_settings(
            &audience,
            &issuer,
            &secret,
            &expire_in_days,
            leeway_seconds,
        )?;

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: lookup("PORT").unwrap_or_else(|| "8080".to_string()),
            database_url: lookup("DATABASE_URL").filter(|url| !url.is_empty()),
            signing,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Convenience for tests and tools that hold settings in a map
impl TryFrom<&HashMap<String, String>> for AppConfig {
    type Error = ConfigError;

    fn try_from(settings: &HashMap<String, String>) -> Result<Self, Self::Error> {
        Self::from_source(|key| settings.get(key).cloned())
    }
}
