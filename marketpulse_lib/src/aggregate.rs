//! Chart-ready aggregate views over a record subset.
//!
//! Each view is an independent pure reduction: [`sentiment_distribution`],
//! [`daily_time_series`], [`impact_category_counts`], [`sector_counts`] and
//! [`keyword_counts`]. [`ChartViews::compute`] runs all five plus the summary
//! statistics. Functions accept any slice of owned or borrowed records so the
//! output of [`crate::filter::Filter::apply`] can be passed straight in.

use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::{ImpactCategory, Record};

/// Upper bound and label of one sentiment histogram bucket.
///
/// Buckets are closed on the upper bound and open on the lower one, except
/// the first which also includes -1.0: `[-1,-0.6] (-0.6,-0.2] (-0.2,0.2]
/// (0.2,0.6] (0.6,1]`.
const SENTIMENT_BUCKETS: [(f64, &str); 5] = [
    (-0.6, "-1.0 ~ -0.6"),
    (-0.2, "-0.6 ~ -0.2"),
    (0.2, "-0.2 ~ 0.2"),
    (0.6, "0.2 ~ 0.6"),
    (1.0, "0.6 ~ 1.0"),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentBucket {
    pub range: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeriesPoint {
    /// Calendar date, `YYYY-MM-DD`.
    pub date: String,
    /// Mean sentiment of the scored records on this date, 0 when none are scored.
    pub sentiment: f64,
    /// Mean market impact of the scored records on this date, 0 when none are scored.
    pub market_impact: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub category: ImpactCategory,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorCount {
    pub sector: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordCount {
    pub keyword: String,
    pub count: usize,
}

/// Headline numbers shown above the charts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryStats {
    pub total_records: usize,
    /// Mean over scored records; `None` when nothing is scored.
    pub avg_sentiment: Option<f64>,
    pub direct_impact_count: usize,
}

/// Display-only truncation applied after aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayLimits {
    /// Keep only the most recent N dates of the daily series.
    pub time_series_days: Option<usize>,
    pub top_sectors: usize,
    pub top_keywords: usize,
}

impl Default for DisplayLimits {
    fn default() -> Self {
        Self {
            time_series_days: None,
            top_sectors: 11,
            top_keywords: 15,
        }
    }
}

/// All chart views for one record subset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartViews {
    pub summary: SummaryStats,
    pub sentiment_distribution: Vec<SentimentBucket>,
    pub time_series: Vec<TimeSeriesPoint>,
    pub impact_categories: Vec<CategoryCount>,
    pub sectors: Vec<SectorCount>,
    pub keywords: Vec<KeywordCount>,
}

impl ChartViews {
    pub fn compute<R: Borrow<Record>>(records: &[R]) -> Self {
        Self {
            summary: summarize(records),
            sentiment_distribution: sentiment_distribution(records),
            time_series: daily_time_series(records),
            impact_categories: impact_category_counts(records),
            sectors: sector_counts(records),
            keywords: keyword_counts(records),
        }
    }

    /// Truncate the views the way the dashboard displays them.
    pub fn with_display_limits(mut self, limits: &DisplayLimits) -> Self {
        if let Some(days) = limits.time_series_days {
            let excess = self.time_series.len().saturating_sub(days);
            self.time_series.drain(..excess);
        }
        self.sectors.truncate(limits.top_sectors);
        self.keywords.truncate(limits.top_keywords);
        self
    }
}

fn iter_records<R: Borrow<Record>>(records: &[R]) -> impl Iterator<Item = &Record> {
    records.iter().map(<R as Borrow<Record>>::borrow)
}

fn sentiment_bucket(score: f64) -> Option<usize> {
    if !score.is_finite() || !(-1.0..=1.0).contains(&score) {
        return None;
    }
    SENTIMENT_BUCKETS.iter().position(|(max, _)| score <= *max)
}

/// Five-bucket sentiment histogram. Unscored records are left out; every
/// bucket is present even when empty.
pub fn sentiment_distribution<R: Borrow<Record>>(records: &[R]) -> Vec<SentimentBucket> {
    let mut counts = [0usize; SENTIMENT_BUCKETS.len()];
    for record in iter_records(records) {
        let Some(score) = record.sentiment_score else {
            continue;
        };
        match sentiment_bucket(score) {
            Some(idx) => counts[idx] += 1,
            None => tracing::debug!(
                "sentiment score {} of record {} is outside [-1, 1]",
                score,
                record.id
            ),
        }
    }

    SENTIMENT_BUCKETS
        .iter()
        .zip(counts)
        .map(|((_, label), count)| SentimentBucket {
            range: label.to_string(),
            count,
        })
        .collect()
}

#[derive(Default)]
struct DailyAccumulator {
    sentiment_sum: f64,
    sentiment_n: usize,
    impact_sum: f64,
    impact_n: usize,
}

fn mean(sum: f64, n: usize) -> f64 {
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

/// Daily means of sentiment and market impact, ascending by date.
///
/// Records whose timestamp does not parse contribute nothing here.
pub fn daily_time_series<R: Borrow<Record>>(records: &[R]) -> Vec<TimeSeriesPoint> {
    let mut days: BTreeMap<NaiveDate, DailyAccumulator> = BTreeMap::new();
    for record in iter_records(records) {
        let Some(ts) = record.parsed_timestamp() else {
            continue;
        };
        let acc = days.entry(ts.date()).or_default();
        if let Some(score) = record.sentiment_score {
            acc.sentiment_sum += score;
            acc.sentiment_n += 1;
        }
        if let Some(score) = record.market_impact_score {
            acc.impact_sum += score;
            acc.impact_n += 1;
        }
    }

    days.into_iter()
        .map(|(date, acc)| TimeSeriesPoint {
            date: date.format("%Y-%m-%d").to_string(),
            sentiment: mean(acc.sentiment_sum, acc.sentiment_n),
            market_impact: mean(acc.impact_sum, acc.impact_n),
        })
        .collect()
}

/// Record count per normalized impact category, in canonical order. Only
/// observed categories are listed.
pub fn impact_category_counts<R: Borrow<Record>>(records: &[R]) -> Vec<CategoryCount> {
    let mut counts: BTreeMap<ImpactCategory, usize> = BTreeMap::new();
    for record in iter_records(records) {
        *counts.entry(record.impact_category()).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(category, count)| CategoryCount { category, count })
        .collect()
}

/// Number of records mentioning each sector, most frequent first.
pub fn sector_counts<R: Borrow<Record>>(records: &[R]) -> Vec<SectorCount> {
    count_tokens(records, Record::sector_tokens, |t| t)
        .into_iter()
        .map(|(sector, count)| SectorCount { sector, count })
        .collect()
}

/// Number of records mentioning each keyword, most frequent first.
/// Keywords are lowercased before grouping.
pub fn keyword_counts<R: Borrow<Record>>(records: &[R]) -> Vec<KeywordCount> {
    count_tokens(records, Record::keyword_tokens, |t| t.to_lowercase())
        .into_iter()
        .map(|(keyword, count)| KeywordCount { keyword, count })
        .collect()
}

/// Counts each distinct token once per record; sorted by count descending,
/// ties by token ascending.
fn count_tokens<R, T, N>(records: &[R], tokens: T, normalize: N) -> Vec<(String, usize)>
where
    R: Borrow<Record>,
    T: Fn(&Record) -> Vec<String>,
    N: Fn(String) -> String,
{
    let mut counts: HashMap<String, usize> = HashMap::new();
    for record in iter_records(records) {
        let distinct: HashSet<String> = tokens(record).into_iter().map(&normalize).collect();
        for token in distinct {
            *counts.entry(token).or_default() += 1;
        }
    }
    let mut sorted: Vec<(String, usize)> = counts.into_iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    sorted
}

pub fn summarize<R: Borrow<Record>>(records: &[R]) -> SummaryStats {
    let scores: Vec<f64> = iter_records(records)
        .filter_map(|r| r.sentiment_score)
        .collect();
    let avg_sentiment = if scores.is_empty() {
        None
    } else {
        Some(scores.iter().sum::<f64>() / scores.len() as f64)
    };
    let direct_impact_count = iter_records(records)
        .filter(|r| r.impact_category() == ImpactCategory::Direct)
        .count();

    SummaryStats {
        total_records: records.len(),
        avg_sentiment,
        direct_impact_count,
    }
}

#[cfg(test)]
#[path = "aggregate_tests.rs"]
mod tests;
