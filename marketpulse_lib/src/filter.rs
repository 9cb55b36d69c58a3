//! Multi-dimensional record filtering.
//!
//! A [`Filter`] is a plain value: every dimension is optional and an unset
//! dimension lets every record through. Active dimensions are combined with
//! AND; inside the set-valued dimensions (impact category, sectors, keywords)
//! a record passes when it matches any requested value.

use std::collections::HashSet;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::timestamp::{end_of_day, start_of_day};
use crate::types::{ImpactCategory, Record};

/// Query over a record snapshot. Built with the `with_*` methods or by
/// deserializing the dashboard's filter object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Filter {
    /// Inclusive; compared against the start of the day.
    pub date_from: Option<NaiveDate>,
    /// Inclusive; compared against 23:59:59.999 of the day.
    pub date_to: Option<NaiveDate>,
    pub sentiment_min: Option<f64>,
    pub sentiment_max: Option<f64>,
    pub impact_category: Vec<ImpactCategory>,
    pub sectors: Vec<String>,
    pub keywords: Vec<String>,
    pub search_text: Option<String>,
}

impl Filter {
    pub fn with_date_from(mut self, date: NaiveDate) -> Self {
        self.date_from = Some(date);
        self
    }

    pub fn with_date_to(mut self, date: NaiveDate) -> Self {
        self.date_to = Some(date);
        self
    }

    pub fn with_sentiment_min(mut self, min: f64) -> Self {
        self.sentiment_min = Some(min);
        self
    }

    pub fn with_sentiment_max(mut self, max: f64) -> Self {
        self.sentiment_max = Some(max);
        self
    }

    pub fn with_impact_category(mut self, category: ImpactCategory) -> Self {
        if !self.impact_category.contains(&category) {
            self.impact_category.push(category);
        }
        self
    }

    pub fn with_sector(mut self, sector: impl Into<String>) -> Self {
        self.sectors.push(sector.into());
        self
    }

    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keywords.push(keyword.into());
        self
    }

    pub fn with_search_text(mut self, text: impl Into<String>) -> Self {
        self.search_text = Some(text.into());
        self
    }

    pub fn has_date_bounds(&self) -> bool {
        self.date_from.is_some() || self.date_to.is_some()
    }

    /// True when no dimension constrains anything.
    pub fn is_unbounded(&self) -> bool {
        !self.has_date_bounds()
            && self.sentiment_min.is_none()
            && self.sentiment_max.is_none()
            && self.impact_category.is_empty()
            && self.sectors.is_empty()
            && self.keywords.is_empty()
            && search_needle(self.search_text.as_deref()).is_none()
    }

    /// The date bounds of this filter with every other dimension cleared.
    pub fn date_window(&self) -> Filter {
        Filter {
            date_from: self.date_from,
            date_to: self.date_to,
            ..Filter::default()
        }
    }

    /// Returns true when `record` passes every active dimension.
    pub fn matches(&self, record: &Record) -> bool {
        Matcher::new(self).matches(record)
    }

    /// Returns the records passing this filter, in input order.
    pub fn apply<'a>(&self, records: &'a [Record]) -> Vec<&'a Record> {
        let matcher = Matcher::new(self);
        records.iter().filter(|r| matcher.matches(r)).collect()
    }
}

/// Free-function form of [`Filter::apply`].
pub fn apply<'a>(records: &'a [Record], filter: &Filter) -> Vec<&'a Record> {
    filter.apply(records)
}

/// Whitespace-only text is no search at all; anything else is matched as
/// typed, surrounding spaces included.
fn search_needle(text: Option<&str>) -> Option<String> {
    let text = text?;
    if text.trim().is_empty() {
        None
    } else {
        Some(text.to_lowercase())
    }
}

fn lowercase_set(values: &[String]) -> HashSet<String> {
    values
        .iter()
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
        .collect()
}

/// A filter with its bounds and match sets precomputed for one pass.
struct Matcher<'f> {
    filter: &'f Filter,
    from: Option<NaiveDateTime>,
    to: Option<NaiveDateTime>,
    sectors: HashSet<String>,
    keywords: HashSet<String>,
    needle: Option<String>,
}

impl<'f> Matcher<'f> {
    fn new(filter: &'f Filter) -> Self {
        Self {
            filter,
            from: filter.date_from.map(start_of_day),
            to: filter.date_to.map(end_of_day),
            sectors: lowercase_set(&filter.sectors),
            keywords: lowercase_set(&filter.keywords),
            needle: search_needle(filter.search_text.as_deref()),
        }
    }

    fn matches(&self, record: &Record) -> bool {
        self.matches_sentiment(record)
            && self.matches_impact(record)
            && self.matches_date(record)
            && self.matches_search(record)
            && (self.sectors.is_empty() || contains_any(&self.sectors, &record.sector_tokens()))
            && (self.keywords.is_empty() || contains_any(&self.keywords, &record.keyword_tokens()))
    }

    fn matches_date(&self, record: &Record) -> bool {
        if self.from.is_none() && self.to.is_none() {
            return true;
        }
        let Some(ts) = record.parsed_timestamp() else {
            tracing::debug!(
                "excluding record {} from date window: unparseable timestamp '{}'",
                record.id,
                record.timestamp
            );
            return false;
        };
        self.from.map_or(true, |from| ts >= from) && self.to.map_or(true, |to| ts <= to)
    }

    fn matches_sentiment(&self, record: &Record) -> bool {
        let (min, max) = (self.filter.sentiment_min, self.filter.sentiment_max);
        if min.is_none() && max.is_none() {
            return true;
        }
        let Some(score) = record.sentiment_score else {
            return false;
        };
        min.map_or(true, |min| score >= min) && max.map_or(true, |max| score <= max)
    }

    fn matches_impact(&self, record: &Record) -> bool {
        self.filter.impact_category.is_empty()
            || self
                .filter
                .impact_category
                .contains(&record.impact_category())
    }

    fn matches_search(&self, record: &Record) -> bool {
        match &self.needle {
            Some(needle) => record.content.to_lowercase().contains(needle.as_str()),
            None => true,
        }
    }
}

fn contains_any(wanted: &HashSet<String>, tokens: &[String]) -> bool {
    tokens
        .iter()
        .any(|token| wanted.contains(&token.to_lowercase()))
}

#[cfg(test)]
#[path = "filter_tests.rs"]
mod tests;
