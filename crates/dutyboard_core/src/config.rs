//! Runtime configuration resolved from environment variables.
//!
//! # Responsibility
//! - Resolve database location, logging setup and runtime mode.
//! - Fall back to deterministic defaults for blank or missing values.
//!
//! # Invariants
//! - Unknown runtime modes are rejected rather than guessed.

use crate::db::shared::IN_MEMORY_LOCATION;
use crate::logging::default_log_level;
use std::path::PathBuf;
use thiserror::Error;

pub const ENV_DB_PATH: &str = "DUTYBOARD_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "DUTYBOARD_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "DUTYBOARD_LOG_DIR";
pub const ENV_MODE: &str = "DUTYBOARD_MODE";

const DEFAULT_DB_FILE_NAME: &str = "dutyboard.sqlite3";
const DEFAULT_LOG_DIR_NAME: &str = "dutyboard-logs";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("unsupported DUTYBOARD_MODE `{0}`; expected development|production")]
    UnknownMode(String),
}

/// Controls how much error detail leaves the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RuntimeMode {
    /// Full diagnostic error payloads.
    Development,
    /// Only `message` and `code` are surfaced.
    #[default]
    Production,
}

impl RuntimeMode {
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => Err(ConfigError::UnknownMode(other.to_string())),
        }
    }

    pub fn is_development(self) -> bool {
        matches!(self, Self::Development)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// SQLite file path, or `:memory:`.
    pub db_location: String,
    pub log_level: String,
    pub log_dir: PathBuf,
    pub mode: RuntimeMode,
}

impl AppConfig {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, treating blank values as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let db_location = read(ENV_DB_PATH).unwrap_or_else(|| {
            std::env::temp_dir()
                .join(DEFAULT_DB_FILE_NAME)
                .display()
                .to_string()
        });
        let log_level = read(ENV_LOG_LEVEL).unwrap_or_else(|| default_log_level().to_string());
        let log_dir = read(ENV_LOG_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_LOG_DIR_NAME));
        let mode = match read(ENV_MODE) {
            Some(value) => RuntimeMode::parse(&value)?,
            None => RuntimeMode::default(),
        };

        Ok(Self {
            db_location,
            log_level,
            log_dir,
            mode,
        })
    }

    pub fn is_in_memory(&self) -> bool {
        self.db_location == IN_MEMORY_LOCATION
    }
}
