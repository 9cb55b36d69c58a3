//! Validation of user-supplied filter input.
//!
//! The filter engine itself never fails; anything that reaches it has gone
//! through these checks first.

use chrono::NaiveDate;

use crate::error::MarketPulseError;
use crate::filter::Filter;
use crate::sector::canonical_sector;
use crate::types::ImpactCategory;

pub const MAX_SEARCH_LENGTH: usize = 100;
pub const MAX_TOKEN_LENGTH: usize = 80;

/// Strip ASCII control characters (0x00-0x1F except space 0x20), trim whitespace,
/// and enforce a byte-length limit.
pub fn sanitize_text(input: &str, max_len: usize) -> Result<String, MarketPulseError> {
    if input.len() > max_len {
        return Err(MarketPulseError::InvalidInput(format!(
            "input exceeds maximum length of {} bytes",
            max_len
        )));
    }
    let sanitized: String = input
        .chars()
        .filter(|c| !c.is_ascii_control() || *c == ' ')
        .collect::<String>()
        .trim()
        .to_string();
    if sanitized.is_empty() {
        return Err(MarketPulseError::InvalidInput(
            "input is empty after sanitization".to_string(),
        ));
    }
    Ok(sanitized)
}

/// Validate free-text search: enforce length and strip control chars.
/// Surrounding spaces are kept since search matches the text as typed.
pub fn validate_search(input: &str) -> Result<String, MarketPulseError> {
    if input.len() > MAX_SEARCH_LENGTH {
        return Err(MarketPulseError::InvalidInput(format!(
            "input exceeds maximum length of {} bytes",
            MAX_SEARCH_LENGTH
        )));
    }
    let sanitized: String = input
        .chars()
        .filter(|c| !c.is_ascii_control() || *c == ' ')
        .collect();
    if sanitized.trim().is_empty() {
        return Err(MarketPulseError::InvalidInput(
            "input is empty after sanitization".to_string(),
        ));
    }
    Ok(sanitized)
}

/// Validate a sector name. GICS sectors are returned with their official
/// spelling; other names pass through trimmed.
pub fn validate_sector(input: &str) -> Result<String, MarketPulseError> {
    let sanitized = sanitize_text(input, MAX_TOKEN_LENGTH)?;
    Ok(canonical_sector(&sanitized))
}

pub fn validate_keyword(input: &str) -> Result<String, MarketPulseError> {
    sanitize_text(input, MAX_TOKEN_LENGTH)
}

/// Validate an impact category: case-insensitive, supports shorthand d/i/n.
pub fn validate_impact_category(input: &str) -> Result<ImpactCategory, MarketPulseError> {
    match input.trim().to_lowercase().as_str() {
        "direct" | "d" => Ok(ImpactCategory::Direct),
        "indirect" | "i" => Ok(ImpactCategory::Indirect),
        "none" | "n" => Ok(ImpactCategory::NoImpact),
        _ => Err(MarketPulseError::InvalidInput(format!(
            "unknown impact category '{}'. Valid values: direct (d), indirect (i), none (n)",
            input
        ))),
    }
}

/// Validate a date in YYYY-MM-DD format.
pub fn validate_date(input: &str) -> Result<NaiveDate, MarketPulseError> {
    let trimmed = input.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map_err(|_| {
        MarketPulseError::InvalidInput(format!(
            "invalid date '{}'. Expected format: YYYY-MM-DD (e.g., 2024-06-01)",
            trimmed
        ))
    })
}

pub fn validate_date_range(
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<(), MarketPulseError> {
    if let (Some(from), Some(to)) = (from, to) {
        if from > to {
            return Err(MarketPulseError::InvalidInput(format!(
                "date range is empty: {} is after {}",
                from, to
            )));
        }
    }
    Ok(())
}

/// Validate relative days: must be 1..=3650 (approx 10 years).
pub fn validate_days(days: i64) -> Result<i64, MarketPulseError> {
    if !(1..=3650).contains(&days) {
        return Err(MarketPulseError::InvalidInput(format!(
            "days must be between 1 and 3650, got {}",
            days
        )));
    }
    Ok(days)
}

/// Validate one sentiment bound: finite and within [-1, 1].
pub fn validate_sentiment_bound(value: f64) -> Result<f64, MarketPulseError> {
    if !value.is_finite() || !(-1.0..=1.0).contains(&value) {
        return Err(MarketPulseError::InvalidInput(format!(
            "sentiment bound must be between -1.0 and 1.0, got {}",
            value
        )));
    }
    Ok(value)
}

pub fn validate_sentiment_range(
    min: Option<f64>,
    max: Option<f64>,
) -> Result<(), MarketPulseError> {
    if let Some(min) = min {
        validate_sentiment_bound(min)?;
    }
    if let Some(max) = max {
        validate_sentiment_bound(max)?;
    }
    if let (Some(min), Some(max)) = (min, max) {
        if min > max {
            return Err(MarketPulseError::InvalidInput(format!(
                "sentiment min {} is greater than max {}",
                min, max
            )));
        }
    }
    Ok(())
}

/// Validate a whole filter (for example one deserialized from JSON) and
/// return it with text fields sanitized and sectors canonicalised.
///
/// Blank search text is dropped rather than rejected, since an empty search
/// box means "no search".
pub fn validate_filter(filter: &Filter) -> Result<Filter, MarketPulseError> {
    validate_date_range(filter.date_from, filter.date_to)?;
    validate_sentiment_range(filter.sentiment_min, filter.sentiment_max)?;

    let search_text = match filter.search_text.as_deref() {
        Some(text) if !text.trim().is_empty() => Some(validate_search(text)?),
        _ => None,
    };
    let sectors = filter
        .sectors
        .iter()
        .map(|s| validate_sector(s))
        .collect::<Result<Vec<_>, _>>()?;
    let keywords = filter
        .keywords
        .iter()
        .map(|k| validate_keyword(k))
        .collect::<Result<Vec<_>, _>>()?;

    let mut impact_category = Vec::with_capacity(filter.impact_category.len());
    for category in &filter.impact_category {
        if !impact_category.contains(category) {
            impact_category.push(*category);
        }
    }

    Ok(Filter {
        date_from: filter.date_from,
        date_to: filter.date_to,
        sentiment_min: filter.sentiment_min,
        sentiment_max: filter.sentiment_max,
        impact_category,
        sectors,
        keywords,
        search_text,
    })
}

#[cfg(test)]
#[path = "validation_tests.rs"]
mod tests;
