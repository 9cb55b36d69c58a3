//! Filter vocabulary: which sectors and keywords can currently be picked.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::filter::Filter;
use crate::types::Record;

/// Distinct sectors and keywords present inside a date window, sorted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    pub available_sectors: Vec<String>,
    /// Lowercased, matching how keyword counts are grouped.
    pub available_keywords: Vec<String>,
}

/// Collect the sector/keyword vocabulary of the records inside `window`'s date
/// bounds. Every other dimension of `window` is ignored, so the choices do not
/// collapse to whatever is currently checked.
pub fn extract_options(records: &[Record], window: &Filter) -> FilterOptions {
    let window = window.date_window();
    let mut sectors = BTreeSet::new();
    let mut keywords = BTreeSet::new();

    for record in window.apply(records) {
        sectors.extend(record.sector_tokens());
        keywords.extend(record.keyword_tokens().into_iter().map(|k| k.to_lowercase()));
    }

    FilterOptions {
        available_sectors: sectors.into_iter().collect(),
        available_keywords: keywords.into_iter().collect(),
    }
}
