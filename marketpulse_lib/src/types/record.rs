//! The classified post record.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::ImpactCategory;
use crate::field_list::parse_field_list;
use crate::timestamp::parse_timestamp;

/// Opaque, stable identifier of a record.
pub type RecordID = String;

/// A single social-media post together with the labels attached upstream.
///
/// Scores are `Option<f64>`: an absent score means "not scored" and is kept
/// apart from a score of `0.0` everywhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordID,

    /// Source link; unique within a snapshot.
    pub url: String,

    #[serde(default)]
    pub content: String,

    /// Raw authoring time as exported. See [`Record::parsed_timestamp`].
    #[serde(alias = "time_str", alias = "timestr")]
    pub timestamp: String,

    #[serde(default)]
    pub platform: Option<String>,

    /// Free-text impact label; normalized by [`Record::impact_category`].
    #[serde(default)]
    pub impact_on_market: Option<String>,

    /// In [-1.0, 1.0] when present.
    #[serde(default)]
    pub sentiment_score: Option<f64>,

    /// In [0.0, 1.0] when present.
    #[serde(default)]
    pub market_impact_score: Option<f64>,

    /// Repeated-value field; see [`crate::field_list`].
    #[serde(default, alias = "sector")]
    pub sectors: Option<String>,

    /// Repeated-value field; see [`crate::field_list`].
    #[serde(default)]
    pub keywords: Option<String>,

    #[serde(default)]
    pub reason: Option<String>,
}

impl Record {
    /// A record with only the required fields populated.
    pub fn new(
        id: impl Into<RecordID>,
        url: impl Into<String>,
        content: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            content: content.into(),
            timestamp: timestamp.into(),
            platform: None,
            impact_on_market: None,
            sentiment_score: None,
            market_impact_score: None,
            sectors: None,
            keywords: None,
            reason: None,
        }
    }

    /// Authoring time, or `None` when the raw value matches no known encoding.
    pub fn parsed_timestamp(&self) -> Option<NaiveDateTime> {
        parse_timestamp(&self.timestamp)
    }

    pub fn impact_category(&self) -> ImpactCategory {
        ImpactCategory::normalize(self.impact_on_market.as_deref())
    }

    /// Decoded sector tokens in source order.
    pub fn sector_tokens(&self) -> Vec<String> {
        parse_field_list(self.sectors.as_deref())
    }

    /// Decoded keyword tokens in source order, case preserved.
    pub fn keyword_tokens(&self) -> Vec<String> {
        parse_field_list(self.keywords.as_deref())
    }

    pub fn with_sentiment(mut self, score: f64) -> Self {
        self.sentiment_score = Some(score);
        self
    }

    pub fn with_market_impact(mut self, score: f64) -> Self {
        self.market_impact_score = Some(score);
        self
    }

    pub fn with_impact(mut self, label: impl Into<String>) -> Self {
        self.impact_on_market = Some(label.into());
        self
    }

    pub fn with_sectors(mut self, raw: impl Into<String>) -> Self {
        self.sectors = Some(raw.into());
        self
    }

    pub fn with_keywords(mut self, raw: impl Into<String>) -> Self {
        self.keywords = Some(raw.into());
        self
    }

    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = Some(platform.into());
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_export_column_names() {
        let json = r#"{
            "id": "7",
            "url": "https://example.com/p/7",
            "content": "Tariffs are coming",
            "time_str": "2024-01-02 09:15:00",
            "impact_on_market": "Direct",
            "sentiment_score": -0.4,
            "sector": "['Industrials', 'Materials']",
            "keywords": "tariffs, steel"
        }"#;
        let record: Record = serde_json::from_str(json).unwrap();
        assert_eq!(record.timestamp, "2024-01-02 09:15:00");
        assert_eq!(record.sentiment_score, Some(-0.4));
        assert_eq!(record.market_impact_score, None);
        assert_eq!(record.impact_category(), ImpactCategory::Direct);
        assert_eq!(record.sector_tokens(), vec!["Industrials", "Materials"]);
        assert_eq!(record.keyword_tokens(), vec!["tariffs", "steel"]);
        assert!(record.parsed_timestamp().is_some());
    }

    #[test]
    fn zero_score_is_not_absent() {
        let record = Record::new("1", "u", "c", "2024-01-01").with_sentiment(0.0);
        assert_eq!(record.sentiment_score, Some(0.0));
        assert_ne!(record.sentiment_score, None);
    }

    #[test]
    fn missing_impact_defaults() {
        let record = Record::new("1", "u", "c", "2024-01-01");
        assert_eq!(record.impact_category(), ImpactCategory::NoImpact);
    }
}
