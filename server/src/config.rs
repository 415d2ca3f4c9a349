//! Application configuration
//!
//! Settings are read from the environment, after loading an optional
//! `.env` file.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::repository::DEFAULT_BUSY_TIMEOUT;

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Service configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// SQLite database file (`TODO_DB_PATH`)
    pub db_path: PathBuf,
    /// Listen host (`APP_HOST`)
    pub app_host: String,
    /// Listen port (`APP_PORT`)
    pub app_port: u16,
    /// Directory for rolling log files (`TODO_LOG_DIR`)
    pub log_dir: PathBuf,
    /// How long a writer waits for the SQLite lock (`TODO_BUSY_TIMEOUT_MS`)
    pub busy_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("todo.db"),
            app_host: "0.0.0.0".to_string(),
            app_port: 8080,
            log_dir: PathBuf::from("logs"),
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }
}

impl AppConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env file is fine
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let app_port = match lookup("APP_PORT") {
            Some(raw) => parse_number("APP_PORT", &raw)?,
            None => defaults.app_port,
        };
        let busy_timeout = match lookup("TODO_BUSY_TIMEOUT_MS") {
            Some(raw) => Duration::from_millis(parse_number("TODO_BUSY_TIMEOUT_MS", &raw)?),
            None => defaults.busy_timeout,
        };

        Ok(Self {
            db_path: lookup("TODO_DB_PATH").map_or(defaults.db_path, PathBuf::from),
            app_host: lookup("APP_HOST").unwrap_or(defaults.app_host),
            app_port,
            log_dir: lookup("TODO_LOG_DIR").map_or(defaults.log_dir, PathBuf::from),
            busy_timeout,
        })
    }

    /// `host:port` to bind
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.app_host, self.app_port)
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key: key.to_string(),
        message: e.to_string(),
    })
}
