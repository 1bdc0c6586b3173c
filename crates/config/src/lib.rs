use dotenv::dotenv;
use dotenv::from_path;
use std::env;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_DATABASE_PATH: &str = "minisocial.db";
pub const DEFAULT_API_HOST: &str = "127.0.0.1";
pub const DEFAULT_API_PORT: u16 = 3000;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Failed to load .env file from path {path}: {reason}")]
    EnvFile { path: String, reason: String },

    #[error("Invalid value {value:?} for {key}: expected {expected}")]
    InvalidValue {
        key: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Where documents are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageBackend {
    #[default]
    Sqlite,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(StorageBackend::Sqlite),
            "memory" => Ok(StorageBackend::Memory),
            _ => Err(()),
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageBackend::Sqlite => write!(f, "sqlite"),
            StorageBackend::Memory => write!(f, "memory"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub storage_backend: StorageBackend,
    pub database_path: String,
    pub api_host: String,
    pub api_port: u16,
    pub migrate_on_startup: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_backend: StorageBackend::Sqlite,
            database_path: DEFAULT_DATABASE_PATH.to_string(),
            api_host: DEFAULT_API_HOST.to_string(),
            api_port: DEFAULT_API_PORT,
            migrate_on_startup: true,
        }
    }
}

impl Config {
    /// Load configuration from a specified `.env` file path or default to the root `.env` file.
    pub fn from_env(env_path: Option<&str>) -> Result<Self, ConfigError> {
        if let Some(path) = env_path {
            from_path(path).map_err(|e| ConfigError::EnvFile {
                path: path.to_string(),
                reason: e.to_string(),
            })?;
        } else {
            // A missing `.env` is fine
            dotenv().ok();
        }

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup; unset keys take defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let storage_backend = match value("STORAGE_BACKEND") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: "STORAGE_BACKEND",
                value: raw,
                expected: "sqlite or memory",
            })?,
            None => defaults.storage_backend,
        };

        let api_port = match value("API_PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "API_PORT",
                value: raw,
                expected: "a port number",
            })?,
            None => defaults.api_port,
        };

        let migrate_on_startup = match value("MIGRATE_ON_STARTUP") {
            Some(raw) => parse_bool(&raw).ok_or(ConfigError::InvalidValue {
                key: "MIGRATE_ON_STARTUP",
                value: raw,
                expected: "true or false",
            })?,
            None => defaults.migrate_on_startup,
        };

        Ok(Self {
            storage_backend,
            database_path: value("DATABASE_PATH").unwrap_or(defaults.database_path),
            api_host: value("API_HOST").unwrap_or(defaults.api_host),
            api_port,
            migrate_on_startup,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api_host, self.api_port)
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
