//! Application configuration loaded from environment variables.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default values used when a variable is unset or blank.
pub mod defaults {
    pub const HOST: &str = "127.0.0.1";
    pub const PORT: u16 = 8000;
    pub const DB_PATH: &str = "predict_history.db";
    pub const UPLOAD_DIR: &str = "uploads";
    pub const DB_MAX_CONNECTIONS: u32 = 5;
    pub const MAX_UPLOAD_SIZE: usize = 10 * 1024 * 1024; // 10MB per image
    pub const INFERENCE_DELAY_MS: u64 = 2_000;
}

/// Runtime environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    /// Parse environment from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Some(Self::Development),
            "production" | "prod" => Some(Self::Production),
            _ => None,
        }
    }

    /// Check if this is a development environment.
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
        }
    }
}

/// SQLite database configuration.
#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    /// Path of the SQLite database file
    pub path: PathBuf,
    /// Upper bound of pooled connections
    pub max_connections: u32,
    /// Connections kept open while idle
    pub min_connections: u32,
}

impl DatabaseSettings {
    /// Settings for a database file with default pool sizes.
    pub fn for_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_connections: defaults::DB_MAX_CONNECTIONS,
            min_connections: 1,
        }
    }

    /// Connection URL; `mode=rwc` creates the file when it does not exist yet.
    pub fn url(&self) -> String {
        format!("sqlite://{}?mode=rwc", self.path.display())
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Runtime environment
    pub environment: Environment,
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// History database settings
    pub database: DatabaseSettings,
    /// Directory holding uploaded image blobs
    pub upload_dir: PathBuf,
    /// Maximum accepted image size in bytes
    pub max_upload_size: usize,
    /// Simulated latency of the placeholder recognizer
    pub inference_delay: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `RUST_ENV`: Environment (development/production, default: development)
    /// - `APP_HOST`: Server host (default: 127.0.0.1)
    /// - `APP_PORT`: Server port (default: 8000)
    /// - `DB_PATH`: SQLite file (default: predict_history.db)
    /// - `UPLOAD_DIR`: Blob directory (default: uploads)
    /// - `DB_MAX_CONNECTIONS`: Connection pool size (default: 5)
    /// - `APP_MAX_UPLOAD_SIZE`: Max image size in bytes (default: 10MB)
    /// - `APP_INFERENCE_DELAY_MS`: Placeholder inference latency (default: 2000)
    ///
    /// Relative paths are resolved against the working directory.
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = match env::var("RUST_ENV") {
            Ok(value) => Environment::parse(&value).ok_or(ConfigError::InvalidValue(
                "RUST_ENV must be 'development' or 'production'",
            ))?,
            Err(_) => Environment::Development,
        };

        let host = env::var("APP_HOST").unwrap_or_else(|_| defaults::HOST.to_string());

        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| defaults::PORT.to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidValue("APP_PORT must be a valid port number"))?;

        let base_dir = env::current_dir()
            .map_err(|_| ConfigError::InvalidValue("working directory is not accessible"))?;

        let db_path = resolve_path(
            env::var("DB_PATH").ok().as_deref(),
            defaults::DB_PATH,
            &base_dir,
        );
        let upload_dir = resolve_path(
            env::var("UPLOAD_DIR").ok().as_deref(),
            defaults::UPLOAD_DIR,
            &base_dir,
        );

        let max_connections = env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| defaults::DB_MAX_CONNECTIONS.to_string())
            .parse::<u32>()
            .ok()
            .filter(|n| *n >= 1)
            .ok_or(ConfigError::InvalidValue(
                "DB_MAX_CONNECTIONS must be a positive number",
            ))?;

        let max_upload_size = env::var("APP_MAX_UPLOAD_SIZE")
            .unwrap_or_else(|_| defaults::MAX_UPLOAD_SIZE.to_string())
            .parse::<usize>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or(ConfigError::InvalidValue(
                "APP_MAX_UPLOAD_SIZE must be a positive number",
            ))?;

        let inference_delay_ms = env::var("APP_INFERENCE_DELAY_MS")
            .unwrap_or_else(|_| defaults::INFERENCE_DELAY_MS.to_string())
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidValue("APP_INFERENCE_DELAY_MS must be a valid number"))?;

        Ok(Config {
            environment,
            host,
            port,
            database: DatabaseSettings {
                path: db_path,
                max_connections,
                min_connections: 1,
            },
            upload_dir,
            max_upload_size,
            inference_delay: Duration::from_millis(inference_delay_ms),
        })
    }

    /// Get the server bind address.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check if running in development mode.
    pub fn is_development(&self) -> bool {
        self.environment.is_development()
    }
}

/// Resolve a configured path, falling back to `default` for unset or blank values.
/// Relative paths are anchored at `base_dir`.
pub fn resolve_path(value: Option<&str>, default: &str, base_dir: &Path) -> PathBuf {
    let path = match value.map(str::trim) {
        Some(v) if !v.is_empty() => PathBuf::from(v),
        _ => PathBuf::from(default),
    };

    if path.is_absolute() {
        path
    } else {
        base_dir.join(path)
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value: {0}")]
    InvalidValue(&'static str),
}
