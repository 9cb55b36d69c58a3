//! CLI subcommand implementations.

pub mod charts;
pub mod import;
pub mod options;
pub mod posts;
pub mod status;

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use clap::Args;
use marketpulse_lib::{validation, DashboardConfig, Db, Filter};

/// Date window shared by every command that reads the snapshot.
///
/// Either relative days (`--days`) or absolute dates (`--since`/`--until`),
/// but not both.
#[derive(Args, Debug, Default)]
pub struct DateWindowArgs {
    /// Only posts from the last N days
    #[arg(long, conflicts_with_all = ["since", "until"])]
    pub days: Option<i64>,

    /// Only posts on or after this date (YYYY-MM-DD)
    #[arg(long, conflicts_with = "days")]
    pub since: Option<String>,

    /// Only posts on or before this date (YYYY-MM-DD)
    #[arg(long, conflicts_with = "days")]
    pub until: Option<String>,
}

impl DateWindowArgs {
    /// Build the date-only filter. Falls back to the configured default
    /// window when no bound is given.
    pub fn to_filter(&self, config: &DashboardConfig, today: NaiveDate) -> Result<Filter> {
        let mut filter = Filter::default();

        if let Some(days) = self.days {
            let validated = validation::validate_days(days)?;
            filter = filter
                .with_date_from(today - chrono::Duration::days(validated))
                .with_date_to(today);
        } else {
            if let Some(ref val) = self.since {
                filter = filter.with_date_from(validation::validate_date(val)?);
            }
            if let Some(ref val) = self.until {
                filter = filter.with_date_to(validation::validate_date(val)?);
            }
        }

        if let (Some(from), Some(to)) = (filter.date_from, filter.date_to) {
            if from > to {
                anyhow::bail!("--since ({}) must be on or before --until ({})", from, to);
            }
        }

        Ok(config.apply_default_window(filter, today))
    }
}

/// Every filter dimension as command-line flags.
#[derive(Args, Debug, Default)]
pub struct FilterArgs {
    #[command(flatten)]
    pub window: DateWindowArgs,

    /// Minimum sentiment score, -1.0 to 1.0 (inclusive)
    #[arg(long, allow_negative_numbers = true)]
    pub sentiment_min: Option<f64>,

    /// Maximum sentiment score, -1.0 to 1.0 (inclusive)
    #[arg(long, allow_negative_numbers = true)]
    pub sentiment_max: Option<f64>,

    /// Impact categories, comma-separated: direct (d), indirect (i), none (n)
    #[arg(long)]
    pub impact: Option<String>,

    /// Sectors, comma-separated (e.g. "Energy,Health Care")
    #[arg(long)]
    pub sector: Option<String>,

    /// Keywords, comma-separated
    #[arg(long)]
    pub keyword: Option<String>,

    /// Case-insensitive text search in post content
    #[arg(long)]
    pub search: Option<String>,
}

impl FilterArgs {
    pub fn to_filter(&self, config: &DashboardConfig, today: NaiveDate) -> Result<Filter> {
        let mut filter = self.window.to_filter(config, today)?;

        if let Some(min) = self.sentiment_min {
            filter = filter.with_sentiment_min(validation::validate_sentiment_bound(min)?);
        }
        if let Some(max) = self.sentiment_max {
            filter = filter.with_sentiment_max(validation::validate_sentiment_bound(max)?);
        }
        validation::validate_sentiment_range(filter.sentiment_min, filter.sentiment_max)?;

        if let Some(ref val) = self.impact {
            for item in val.split(',') {
                filter = filter.with_impact_category(validation::validate_impact_category(item)?);
            }
        }

        if let Some(ref val) = self.sector {
            for item in val.split(',') {
                filter = filter.with_sector(validation::validate_sector(item)?);
            }
        }

        if let Some(ref val) = self.keyword {
            for item in val.split(',') {
                filter = filter.with_keyword(validation::validate_keyword(item)?);
            }
        }

        if let Some(ref val) = self.search {
            if !val.trim().is_empty() {
                filter = filter.with_search_text(validation::validate_search(val)?);
            }
        }

        Ok(filter)
    }
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Open the configured SQLite store, creating the schema if needed.
pub fn open_db(config: &DashboardConfig) -> Result<Db> {
    let db = Db::open(&config.database)?;
    db.init()?;
    Ok(db)
}

#[cfg(test)]
mod tests {
    use super::*;
    use marketpulse_lib::ImpactCategory;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn days_window_ends_today() {
        let args = DateWindowArgs {
            days: Some(7),
            ..DateWindowArgs::default()
        };
        let filter = args
            .to_filter(&DashboardConfig::default(), date(2024, 3, 10))
            .unwrap();
        assert_eq!(filter.date_from, Some(date(2024, 3, 3)));
        assert_eq!(filter.date_to, Some(date(2024, 3, 10)));
    }

    #[test]
    fn inverted_dates_rejected() {
        let args = DateWindowArgs {
            since: Some("2024-03-10".into()),
            until: Some("2024-03-01".into()),
            ..DateWindowArgs::default()
        };
        assert!(args.to_filter(&DashboardConfig::default(), date(2024, 3, 10)).is_err());
    }

    #[test]
    fn configured_default_window_applies() {
        let config = DashboardConfig {
            default_window_days: Some(30),
            ..DashboardConfig::default()
        };
        let filter = DateWindowArgs::default()
            .to_filter(&config, date(2024, 3, 31))
            .unwrap();
        assert_eq!(filter.date_from, Some(date(2024, 3, 1)));
    }

    #[test]
    fn filter_flags_are_validated() {
        let args = FilterArgs {
            impact: Some("d, n".into()),
            sector: Some("energy,Crypto".into()),
            keyword: Some("oil".into()),
            sentiment_min: Some(-0.5),
            search: Some("  ".into()),
            ..FilterArgs::default()
        };
        let filter = args
            .to_filter(&DashboardConfig::default(), date(2024, 1, 1))
            .unwrap();
        assert_eq!(
            filter.impact_category,
            vec![ImpactCategory::Direct, ImpactCategory::NoImpact]
        );
        assert_eq!(filter.sectors, vec!["Energy", "Crypto"]);
        assert_eq!(filter.keywords, vec!["oil"]);
        assert_eq!(filter.sentiment_min, Some(-0.5));
        assert!(filter.search_text.is_none());
    }

    #[test]
    fn bad_impact_rejected() {
        let args = FilterArgs {
            impact: Some("maybe".into()),
            ..FilterArgs::default()
        };
        assert!(args.to_filter(&DashboardConfig::default(), date(2024, 1, 1)).is_err());
    }

    #[test]
    fn inverted_sentiment_rejected() {
        let args = FilterArgs {
            sentiment_min: Some(0.5),
            sentiment_max: Some(-0.5),
            ..FilterArgs::default()
        };
        assert!(args.to_filter(&DashboardConfig::default(), date(2024, 1, 1)).is_err());
    }
}
