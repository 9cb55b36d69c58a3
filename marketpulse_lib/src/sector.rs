//! GICS sector vocabulary.
//!
//! Posts are labelled with free-text sector names, but the classifier was
//! prompted with the 11 GICS sectors, so that list doubles as the default
//! filter vocabulary before any data is loaded.

/// The 11 official GICS sectors.
pub const GICS_SECTORS: &[&str] = &[
    "Communication Services",
    "Consumer Discretionary",
    "Consumer Staples",
    "Energy",
    "Financials",
    "Health Care",
    "Industrials",
    "Information Technology",
    "Materials",
    "Real Estate",
    "Utilities",
];

/// Returns the official GICS spelling when `sector` names one
/// (case-insensitive), `None` otherwise.
pub fn gics_sector(sector: &str) -> Option<&'static str> {
    let normalized = sector.trim();
    GICS_SECTORS
        .iter()
        .copied()
        .find(|gics| gics.eq_ignore_ascii_case(normalized))
}

/// Canonicalises a sector name: GICS names get the official capitalization,
/// anything else is returned trimmed but otherwise untouched.
pub fn canonical_sector(sector: &str) -> String {
    gics_sector(sector)
        .map(str::to_string)
        .unwrap_or_else(|| sector.trim().to_string())
}
