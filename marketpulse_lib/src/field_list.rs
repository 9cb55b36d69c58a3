//! Decoding of repeated-value text columns (`sectors`, `keywords`).
//!
//! Historical exports store these columns in two shapes: a stringified
//! Python-style list (`['Energy', 'Financials']`) and a bare comma-separated
//! string (`Energy, Financials`). [`parse_field_list`] detects which one it is
//! looking at and returns the same tokens for both.

use std::sync::OnceLock;

use regex::Regex;

fn quoted_item_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"'([^']*)'").expect("quoted item pattern compiles"))
}

fn quoted_separator_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"'\s*,\s*'").expect("quoted separator pattern compiles"))
}

/// Decode a repeated-value field into its tokens.
///
/// Tokens keep source order and are not deduplicated; callers that need set
/// semantics collapse duplicates themselves. Absent input yields an empty list.
///
/// # Examples
/// ```
/// use marketpulse_lib::field_list::parse_field_list;
///
/// assert_eq!(parse_field_list(Some("['Energy', 'Financials']")), vec!["Energy", "Financials"]);
/// assert_eq!(parse_field_list(Some("Energy, Financials")), vec!["Energy", "Financials"]);
/// assert!(parse_field_list(None).is_empty());
/// ```
pub fn parse_field_list(raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw else {
        return Vec::new();
    };

    if looks_quoted(raw) {
        let quoted = extract_quoted(raw);
        if !quoted.is_empty() {
            return quoted;
        }
    }

    split_bare(raw)
}

fn looks_quoted(raw: &str) -> bool {
    let trimmed = raw.trim_start();
    trimmed.starts_with('[') || trimmed.starts_with('\'') || quoted_separator_re().is_match(raw)
}

fn extract_quoted(raw: &str) -> Vec<String> {
    quoted_item_re()
        .captures_iter(raw)
        .filter_map(|cap| cap.get(1))
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

// Tokens containing an apostrophe are not protected here; this path only
// runs when no quoted-list markers were found.
fn split_bare(raw: &str) -> Vec<String> {
    let trimmed = raw.trim();
    let body = trimmed
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .unwrap_or(trimmed);
    body.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoted_list_with_brackets() {
        assert_eq!(
            parse_field_list(Some("['Energy', 'Financials']")),
            vec!["Energy", "Financials"]
        );
    }

    #[test]
    fn quoted_list_without_brackets_matches_bare() {
        let quoted = parse_field_list(Some("'A', 'B'"));
        let bare = parse_field_list(Some("A, B"));
        assert_eq!(quoted, vec!["A", "B"]);
        assert_eq!(quoted, bare);
    }

    #[test]
    fn quoted_list_tight_separator() {
        assert_eq!(
            parse_field_list(Some("'Energy','Utilities'")),
            vec!["Energy", "Utilities"]
        );
    }

    #[test]
    fn single_quoted_item() {
        assert_eq!(parse_field_list(Some("['Energy']")), vec!["Energy"]);
        assert_eq!(parse_field_list(Some("'Energy'")), vec!["Energy"]);
    }

    #[test]
    fn bracket_without_quotes_falls_back_to_split() {
        assert!(parse_field_list(Some("[]")).is_empty());
        assert_eq!(
            parse_field_list(Some("[Energy, Financials]")),
            vec!["Energy", "Financials"]
        );
        assert_eq!(
            parse_field_list(Some("[Energy, Financials")),
            vec!["[Energy", "Financials"]
        );
    }

    #[test]
    fn bare_list_trims_and_drops_empty() {
        assert_eq!(
            parse_field_list(Some(" tariffs ,, trade war , ")),
            vec!["tariffs", "trade war"]
        );
    }

    #[test]
    fn keeps_order_and_duplicates() {
        assert_eq!(
            parse_field_list(Some("Energy, Financials, Energy")),
            vec!["Energy", "Financials", "Energy"]
        );
    }

    #[test]
    fn absent_and_blank_are_empty() {
        assert!(parse_field_list(None).is_empty());
        assert!(parse_field_list(Some("")).is_empty());
        assert!(parse_field_list(Some("   ")).is_empty());
    }

    #[test]
    fn quoted_tokens_never_keep_quotes() {
        for token in parse_field_list(Some("['Health Care', 'Real Estate']")) {
            assert!(!token.contains('\''));
        }
    }
}
