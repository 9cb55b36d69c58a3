//! Ordering of records for listing.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::Record;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    Time,
    Sentiment,
    MarketImpact,
    Impact,
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "time" | "timestamp" | "date" => Ok(Self::Time),
            "sentiment" | "sentiment_score" => Ok(Self::Sentiment),
            "market_impact" | "market_impact_score" => Ok(Self::MarketImpact),
            "impact" | "impact_on_market" => Ok(Self::Impact),
            _ => Err(format!(
                "unknown sort field '{}'. Valid values: time, sentiment, market-impact, impact",
                s
            )),
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Time => "time",
            Self::Sentiment => "sentiment",
            Self::MarketImpact => "market-impact",
            Self::Impact => "impact",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

fn record<R: Borrow<Record>>(r: &R) -> &Record {
    <R as Borrow<Record>>::borrow(r)
}

/// Compare two optional keys so that `None` ends up last in either direction.
fn cmp_present_first<T, F>(a: Option<T>, b: Option<T>, direction: SortDirection, cmp: F) -> Ordering
where
    F: Fn(&T, &T) -> Ordering,
{
    match (a, b) {
        (Some(a), Some(b)) => match direction {
            SortDirection::Asc => cmp(&a, &b),
            SortDirection::Desc => cmp(&b, &a),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Sort records in place. The sort is stable; records with no value for the
/// key (unscored, unparseable timestamp) always come after the rest.
pub fn sort_records<R>(records: &mut [R], field: SortField, direction: SortDirection)
where
    R: Borrow<Record>,
{
    match field {
        // Parsed once per record; absent timestamps sort after the rest.
        SortField::Time => records.sort_by_cached_key(|r| {
            let micros = record(r)
                .parsed_timestamp()
                .map(|ts| ts.and_utc().timestamp_micros());
            let key = match direction {
                SortDirection::Asc => micros,
                SortDirection::Desc => micros.map(|m| -m),
            };
            (key.is_none(), key)
        }),
        SortField::Sentiment => records.sort_by(|a, b| {
            cmp_present_first(
                record(a).sentiment_score,
                record(b).sentiment_score,
                direction,
                |x, y| x.total_cmp(y),
            )
        }),
        SortField::MarketImpact => records.sort_by(|a, b| {
            cmp_present_first(
                record(a).market_impact_score,
                record(b).market_impact_score,
                direction,
                |x, y| x.total_cmp(y),
            )
        }),
        SortField::Impact => records.sort_by(|a, b| {
            cmp_present_first(
                Some(record(a).impact_category()),
                Some(record(b).impact_category()),
                direction,
                |x, y| x.cmp(y),
            )
        }),
    }
}
