//! Library layer for MarketPulse: filtering and chart aggregation over
//! sentiment-labelled social posts.
//!
//! Records are held as an immutable snapshot (in memory or in SQLite), a
//! [`Filter`] selects a subset, and [`ChartViews`] reduces that subset to the
//! dashboard's chart series. [`extract_options`] supplies the sector and
//! keyword vocabulary for the current date window.

pub mod aggregate;
pub mod config;
pub mod db;
pub mod error;
pub mod field_list;
pub mod filter;
pub mod import;
pub mod options;
pub mod sector;
pub mod sort;
pub mod store;
pub mod timestamp;
pub mod types;
pub mod validation;

pub use aggregate::{ChartViews, DisplayLimits, SummaryStats};
pub use config::{ConfigError, DashboardConfig};
pub use db::{Db, DbError};
pub use error::MarketPulseError;
pub use field_list::parse_field_list;
pub use filter::Filter;
pub use import::{ImportError, ParsedImport, RawPostRow};
pub use options::{extract_options, FilterOptions};
pub use sort::{sort_records, SortDirection, SortField};
pub use store::{DataSource, MemoryStore, Snapshot};
pub use types::{ImpactCategory, Record, RecordID, UploadMetadata};
