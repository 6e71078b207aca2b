use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

/// Placeholder secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &["change-me-to-a-random-string", "dev-secret-change-me"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("WARBLER_JWT_SECRET is unset or still a placeholder")]
    MissingSecret,

    #[error("{key} has an invalid value '{value}'")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub jwt_secret: String,
    pub db_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub session_days: i64,
    pub allow_self_like: bool,
    pub timeline_limit: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup, so tests need not touch the process
    /// environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("WARBLER_JWT_SECRET").unwrap_or_default();
        if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            return Err(ConfigError::MissingSecret);
        }

        Ok(Self {
            jwt_secret,
            db_path: lookup("WARBLER_DB_PATH").unwrap_or_else(|| "warbler.db".into()).into(),
            host: lookup("WARBLER_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: parse_or(&lookup, "WARBLER_PORT", 3000)?,
            session_days: parse_or(&lookup, "WARBLER_SESSION_DAYS", 30)?,
            allow_self_like: parse_or(&lookup, "WARBLER_ALLOW_SELF_LIKE", true)?,
            timeline_limit: parse_or(&lookup, "WARBLER_TIMELINE_LIMIT", 100)?,
        })
    }

    pub fn addr(&self) -> Result<SocketAddr, ConfigError> {
        let raw = format!("{}:{}", self.host, self.port);
        raw.parse().map_err(|_| ConfigError::Invalid {
            key: "WARBLER_HOST",
            value: raw,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}
