//! Dashboard configuration loaded from TOML.
//!
//! ```toml
//! database = "marketpulse.db"
//! default_window_days = 30
//!
//! [display]
//! time_series_days = 30
//! top_sectors = 11
//! top_keywords = 15
//! ```

use std::path::{Path, PathBuf};

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::aggregate::DisplayLimits;
use crate::filter::Filter;

pub const DEFAULT_CONFIG_FILE: &str = "marketpulse.toml";
pub const DEFAULT_DATABASE: &str = "marketpulse.db";
pub const DATABASE_ENV: &str = "MARKETPULSE_DB";

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("toml parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// SQLite file backing the record store.
    pub database: PathBuf,
    /// When set, an unbounded date window defaults to the last N days.
    pub default_window_days: Option<i64>,
    pub display: DisplayLimits,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            database: PathBuf::from(DEFAULT_DATABASE),
            default_window_days: None,
            display: DisplayLimits::default(),
        }
    }
}

impl DashboardConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: DashboardConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Load `path` when given, else `marketpulse.toml` if it exists, else
    /// defaults. An explicitly named file must exist.
    pub fn discover(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.exists() {
                    tracing::debug!("loading config from {}", fallback.display());
                    Self::load(fallback)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Apply `MARKETPULSE_DB` on top of the file settings.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(db) = std::env::var(DATABASE_ENV).ok().filter(|v| !v.trim().is_empty()) {
            self.database = PathBuf::from(db);
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(days) = self.default_window_days {
            if days <= 0 {
                return Err(ConfigError::Invalid(format!(
                    "default_window_days must be positive, got {}",
                    days
                )));
            }
        }
        if self.display.time_series_days == Some(0) {
            return Err(ConfigError::Invalid(
                "display.time_series_days must be at least 1".to_string(),
            ));
        }
        if self.display.top_sectors == 0 {
            return Err(ConfigError::Invalid(
                "display.top_sectors must be at least 1".to_string(),
            ));
        }
        if self.display.top_keywords == 0 {
            return Err(ConfigError::Invalid(
                "display.top_keywords must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Fill in the configured default window when `filter` has no date
    /// bound of its own. The window ends on `today`.
    pub fn apply_default_window(&self, filter: Filter, today: NaiveDate) -> Filter {
        match self.default_window_days {
            Some(days) if !filter.has_date_bounds() => filter
                .with_date_from(today - Duration::days(days))
                .with_date_to(today),
            _ => filter,
        }
    }
}
