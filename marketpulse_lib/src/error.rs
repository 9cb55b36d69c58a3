//! Error types for the library layer.

use std::fmt;

use crate::config::ConfigError;
use crate::db::DbError;
use crate::import::ImportError;

/// Errors produced by the library layer, wrapping the storage, import and
/// configuration errors and adding input validation failures.
#[derive(Debug)]
pub enum MarketPulseError {
    /// The SQLite store failed.
    Db(DbError),
    /// A bulk import could not produce a snapshot.
    Import(ImportError),
    /// The configuration file could not be loaded.
    Config(ConfigError),
    /// User-provided filter input failed validation.
    InvalidInput(String),
}

impl fmt::Display for MarketPulseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Db(e) => write!(f, "Database error: {}", e),
            Self::Import(e) => write!(f, "Import error: {}", e),
            Self::Config(e) => write!(f, "Config error: {}", e),
            Self::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
        }
    }
}

impl std::error::Error for MarketPulseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Db(e) => Some(e),
            Self::Import(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::InvalidInput(_) => None,
        }
    }
}

impl From<DbError> for MarketPulseError {
    fn from(e: DbError) -> Self {
        Self::Db(e)
    }
}

impl From<ImportError> for MarketPulseError {
    fn from(e: ImportError) -> Self {
        Self::Import(e)
    }
}

impl From<ConfigError> for MarketPulseError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}
