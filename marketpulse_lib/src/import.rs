//! Bulk import of exported post rows into a record snapshot.
//!
//! Rows come from a spreadsheet export (read as CSV by the CLI) or a JSON
//! array. Column names follow the export: `time_str`/`timestr`/`time`,
//! `content`, `url`, `platform`, `impact_on_market`, `sentiment_score`,
//! `market_impact_score`, `keywords`, `sector`, `reason` and an optional `id`.

use std::collections::HashSet;
use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::store::DataSource;
use crate::types::{Record, UploadMetadata};

#[derive(thiserror::Error, Debug)]
pub enum ImportError {
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no valid rows among {total_rows} ({rejected} rejected)")]
    NoValidRows { total_rows: usize, rejected: usize },
    #[error("store error: {0}")]
    Store(Box<dyn std::error::Error + Send + Sync>),
}

/// A score cell: numeric in JSON, text in a spreadsheet export.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawScore {
    Number(f64),
    Text(String),
}

impl RawScore {
    /// The finite numeric value, if any. Blank, non-numeric, NaN and
    /// infinite cells all read as "not scored".
    pub fn value(&self) -> Option<f64> {
        let value = match self {
            Self::Number(n) => *n,
            Self::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        value.is_finite().then_some(value)
    }
}

/// One row as exported, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPostRow {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, alias = "time_str", alias = "timestr", alias = "time")]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub impact_on_market: Option<String>,
    #[serde(default)]
    pub sentiment_score: Option<RawScore>,
    #[serde(default)]
    pub market_impact_score: Option<RawScore>,
    #[serde(default)]
    pub keywords: Option<String>,
    #[serde(default, alias = "sectors")]
    pub sector: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

/// A rejected row. `row` counts the header, so the first data row is 2.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowError {
    pub row: usize,
    pub message: String,
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Row {}: {}", self.row, self.message)
    }
}

/// Result of converting raw rows: the accepted records and one error per
/// rejected row.
#[derive(Debug, Clone, Default)]
pub struct ParsedImport {
    pub records: Vec<Record>,
    pub total_rows: usize,
    pub errors: Vec<RowError>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Decode a JSON array of export rows.
pub fn rows_from_json(json: &str) -> Result<Vec<RawPostRow>, ImportError> {
    Ok(serde_json::from_str(json)?)
}

/// Convert raw rows into records.
///
/// Rows without a timestamp or content, and rows repeating an earlier url or
/// id, are rejected. Ids are taken from the `id` column, then the url, then
/// the spreadsheet row number.
pub fn parse_rows<I>(rows: I) -> ParsedImport
where
    I: IntoIterator<Item = RawPostRow>,
{
    let mut parsed = ParsedImport::default();
    let mut seen_urls: HashSet<String> = HashSet::new();
    let mut seen_ids: HashSet<String> = HashSet::new();

    for (index, raw) in rows.into_iter().enumerate() {
        parsed.total_rows += 1;
        let row = index + 2;
        match convert_row(raw, row, &mut seen_urls, &mut seen_ids) {
            Ok(record) => parsed.records.push(record),
            Err(message) => {
                tracing::warn!("Row {}: {}", row, message);
                parsed.errors.push(RowError { row, message });
            }
        }
    }

    parsed
}

fn convert_row(
    raw: RawPostRow,
    row: usize,
    seen_urls: &mut HashSet<String>,
    seen_ids: &mut HashSet<String>,
) -> Result<Record, String> {
    let (Some(timestamp), Some(content)) = (non_blank(raw.timestamp), non_blank(raw.content))
    else {
        return Err("Missing required fields (timestamp or content)".to_string());
    };

    let url = non_blank(raw.url).unwrap_or_default();
    if !url.is_empty() && seen_urls.contains(&url) {
        return Err(format!("Duplicate url '{}'", url));
    }

    let id = non_blank(raw.id)
        .or_else(|| (!url.is_empty()).then(|| url.clone()))
        .unwrap_or_else(|| format!("row-{}", row));
    if seen_ids.contains(&id) {
        return Err(format!("Duplicate id '{}'", id));
    }

    if !url.is_empty() {
        seen_urls.insert(url.clone());
    }
    seen_ids.insert(id.clone());

    Ok(Record {
        id,
        url,
        content,
        timestamp,
        platform: non_blank(raw.platform),
        impact_on_market: non_blank(raw.impact_on_market),
        sentiment_score: raw.sentiment_score.as_ref().and_then(RawScore::value),
        market_impact_score: raw.market_impact_score.as_ref().and_then(RawScore::value),
        sectors: non_blank(raw.sector),
        keywords: non_blank(raw.keywords),
        reason: non_blank(raw.reason),
    })
}

/// Replace the store's snapshot with the parsed records and record the
/// upload metadata. An import without a single valid row leaves the store
/// untouched.
pub fn commit<S>(store: &S, filename: &str, parsed: ParsedImport) -> Result<UploadMetadata, ImportError>
where
    S: DataSource,
{
    if parsed.records.is_empty() {
        return Err(ImportError::NoValidRows {
            total_rows: parsed.total_rows,
            rejected: parsed.errors.len(),
        });
    }

    let metadata = UploadMetadata {
        filename: filename.to_string(),
        uploaded_at: Utc::now(),
        total_records: parsed.records.len(),
    };
    store
        .replace_snapshot(parsed.records, metadata.clone())
        .map_err(|e| ImportError::Store(Box::new(e)))?;
    tracing::info!(
        "imported {} of {} rows from {}",
        metadata.total_records,
        parsed.total_rows,
        filename
    );
    Ok(metadata)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn row(timestamp: &str, content: &str, url: &str) -> RawPostRow {
        RawPostRow {
            timestamp: Some(timestamp.to_string()),
            content: Some(content.to_string()),
            url: Some(url.to_string()),
            ..RawPostRow::default()
        }
    }

    #[test]
    fn missing_required_fields_report_spreadsheet_row() {
        let rows = vec![
            row("2024-01-01", "ok", "u1"),
            row("", "no time", "u2"),
            row("2024-01-01", "  ", "u3"),
        ];
        let parsed = parse_rows(rows);
        assert_eq!(parsed.total_rows, 3);
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.errors.len(), 2);
        assert_eq!(parsed.errors[0].row, 3);
        assert_eq!(parsed.errors[1].row, 4);
        assert!(parsed.errors[0].to_string().starts_with("Row 3: Missing required fields"));
    }

    #[test]
    fn duplicate_url_rejected() {
        let parsed = parse_rows(vec![
            row("2024-01-01", "a", "https://x/1"),
            row("2024-01-02", "b", "https://x/1"),
        ]);
        assert_eq!(parsed.records.len(), 1);
        assert!(parsed.errors[0].message.contains("Duplicate url"));
    }

    #[test]
    fn ids_fall_back_to_url_then_row() {
        let mut with_id = row("2024-01-01", "a", "u1");
        with_id.id = Some("42".into());
        let parsed = parse_rows(vec![with_id, row("2024-01-01", "b", "u2"), row("2024-01-01", "c", "")]);
        let ids: Vec<&str> = parsed.records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["42", "u2", "row-4"]);
    }

    #[test]
    fn scores_parse_or_become_absent() {
        assert_eq!(RawScore::Text(" 0.0 ".into()).value(), Some(0.0));
        assert_eq!(RawScore::Text("-0.35".into()).value(), Some(-0.35));
        assert_eq!(RawScore::Text("".into()).value(), None);
        assert_eq!(RawScore::Text("n/a".into()).value(), None);
        assert_eq!(RawScore::Text("NaN".into()).value(), None);
        assert_eq!(RawScore::Number(f64::INFINITY).value(), None);
        assert_eq!(RawScore::Number(0.7).value(), Some(0.7));
    }

    #[test]
    fn json_rows_accept_numbers_and_strings() {
        let json = r#"[
            {"timestr": "2024-01-01", "content": "a", "url": "u1", "sentiment_score": 0.5, "market_impact_score": "0.25"},
            {"time": "2024-01-02", "content": "b", "url": "u2", "sentiment_score": null, "sector": "Energy"}
        ]"#;
        let parsed = parse_rows(rows_from_json(json).unwrap());
        assert!(parsed.errors.is_empty());
        assert_eq!(parsed.records[0].sentiment_score, Some(0.5));
        assert_eq!(parsed.records[0].market_impact_score, Some(0.25));
        assert_eq!(parsed.records[1].sentiment_score, None);
        assert_eq!(parsed.records[1].sectors.as_deref(), Some("Energy"));
    }

    #[test]
    fn commit_replaces_store() {
        let store = MemoryStore::new();
        let parsed = parse_rows(vec![row("2024-01-01", "a", "u1"), row("2024-01-02", "b", "u2")]);
        let meta = commit(&store, "posts.csv", parsed).unwrap();
        assert_eq!(meta.total_records, 2);
        assert_eq!(store.get_all().unwrap().len(), 2);
        assert_eq!(store.metadata().unwrap().unwrap().filename, "posts.csv");
    }

    #[test]
    fn commit_into_db_records_metadata_with_posts() {
        let db = crate::db::Db::open_in_memory().unwrap();
        db.init().unwrap();
        let parsed = parse_rows(vec![row("2024-01-01", "a", "u1")]);
        commit(&db, "posts.csv", parsed).unwrap();

        let mut bad = parse_rows(vec![row("2024-01-01", "a", "u1"), row("2024-01-02", "b", "u2")]);
        bad.records[1].id = bad.records[0].id.clone();
        assert!(matches!(commit(&db, "bad.csv", bad), Err(ImportError::Store(_))));
        assert_eq!(db.get_all().unwrap().len(), 1);
        assert_eq!(db.metadata().unwrap().unwrap().filename, "posts.csv");
    }

    #[test]
    fn commit_without_valid_rows_keeps_previous_snapshot() {
        let store = MemoryStore::with_records(vec![Record::new("keep", "u", "c", "2024-01-01")]);
        let parsed = parse_rows(vec![row("", "", "u1")]);
        let err = commit(&store, "bad.csv", parsed).unwrap_err();
        assert!(matches!(err, ImportError::NoValidRows { total_rows: 1, rejected: 1 }));
        assert_eq!(store.get_all().unwrap()[0].id, "keep");
        assert!(store.metadata().unwrap().is_none());
    }
}
