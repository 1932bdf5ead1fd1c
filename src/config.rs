//! Configuration loaded from an optional `.env` file and the environment.

use std::path::PathBuf;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

pub const DATABASE_VAR: &str = "HANDREST_DATABASE";
pub const LOG_VAR: &str = "HANDREST_LOG";
pub const MAX_CONNECTIONS_VAR: &str = "HANDREST_DB_MAX_CONNECTIONS";

const DEFAULT_DATABASE: &str = "handrest.db";
const DEFAULT_LOG: &str = "info";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value}")]
    InvalidValue { var: String, value: String },

    #[error("Failed to load .env file from {path}: {source}")]
    EnvFileLoad {
        path: PathBuf,
        #[source]
        source: dotenv::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub database: PathBuf,
    /// `tracing` filter directive, e.g. `info` or `handrest=debug`.
    pub log_filter: String,
    pub max_connections: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: PathBuf::from(DEFAULT_DATABASE),
            log_filter: DEFAULT_LOG.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    env_file_path: Option<PathBuf>,
}

impl ConfigLoader {
    pub fn new(env_file_path: Option<PathBuf>) -> Self {
        Self { env_file_path }
    }

    /// Load the `.env` file if one was given, then read the environment.
    pub fn load(&self) -> Result<AppConfig> {
        if let Some(path) = &self.env_file_path {
            dotenv::from_path(path).map_err(|source| ConfigError::EnvFileLoad {
                path: path.clone(),
                source,
            })?;
        }
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<AppConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = AppConfig::default();

        if let Some(database) = lookup(DATABASE_VAR) {
            if database.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    var: DATABASE_VAR.to_string(),
                    value: database,
                });
            }
            config.database = PathBuf::from(database);
        }

        if let Some(filter) = lookup(LOG_VAR) {
            if EnvFilter::try_new(&filter).is_err() {
                return Err(ConfigError::InvalidValue {
                    var: LOG_VAR.to_string(),
                    value: filter,
                });
            }
            config.log_filter = filter;
        }

        if let Some(raw) = lookup(MAX_CONNECTIONS_VAR) {
            config.max_connections = match raw.trim().parse::<u32>() {
                Ok(n) if n >= 1 => n,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        var: MAX_CONNECTIONS_VAR.to_string(),
                        value: raw,
                    });
                }
            };
        }

        Ok(config)
    }
}
