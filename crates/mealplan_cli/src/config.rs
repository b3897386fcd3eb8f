//! Environment-driven configuration for the `mealplan` binary.
//!
//! # Responsibility
//! - Resolve database path and logging settings once at startup.
//!
//! # Invariants
//! - Every setting has a default; a missing or blank variable never fails.

use mealplan_core::default_log_level;
use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "MEALPLAN_DB_PATH";
pub const LOG_LEVEL_ENV: &str = "MEALPLAN_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "MEALPLAN_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "meals.sqlite3";
const DEFAULT_LOG_DIR_NAME: &str = "mealplan-logs";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    /// Validated as absolute by logging init, not here.
    pub log_dir: PathBuf,
}

impl CliConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds config from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let value = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty())
        };

        Self {
            db_path: value(DB_PATH_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_FILE_NAME)),
            log_level: value(LOG_LEVEL_ENV).unwrap_or_else(|| default_log_level().to_string()),
            log_dir: value(LOG_DIR_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_LOG_DIR_NAME)),
        }
    }
}
