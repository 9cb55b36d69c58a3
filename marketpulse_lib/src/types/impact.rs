//! Market impact classification attached to each post.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Normalized three-way impact classification.
///
/// Storage keeps the label as free text; [`ImpactCategory::normalize`] maps it
/// onto this enum at read time, defaulting to [`ImpactCategory::NoImpact`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ImpactCategory {
    Direct,
    Indirect,
    #[serde(rename = "None")]
    NoImpact,
}

impl ImpactCategory {
    /// All categories in display order.
    pub const ALL: [ImpactCategory; 3] = [
        ImpactCategory::Direct,
        ImpactCategory::Indirect,
        ImpactCategory::NoImpact,
    ];

    /// Map a stored label onto a category. Absent, blank, or unrecognised
    /// labels are treated as no impact.
    pub fn normalize(raw: Option<&str>) -> Self {
        raw.and_then(|s| s.parse().ok())
            .unwrap_or(ImpactCategory::NoImpact)
    }

    /// Canonical label, as stored by the classification pipeline.
    pub fn as_str(&self) -> &'static str {
        match self {
            ImpactCategory::Direct => "Direct",
            ImpactCategory::Indirect => "Indirect",
            ImpactCategory::NoImpact => "None",
        }
    }
}

impl std::fmt::Display for ImpactCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImpactCategory {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_lowercase().as_str() {
            "direct" | "직접" => Ok(ImpactCategory::Direct),
            "indirect" | "간접" => Ok(ImpactCategory::Indirect),
            "none" | "없음" => Ok(ImpactCategory::NoImpact),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_canonical_labels() {
        assert_eq!(ImpactCategory::normalize(Some("Direct")), ImpactCategory::Direct);
        assert_eq!(ImpactCategory::normalize(Some("Indirect")), ImpactCategory::Indirect);
        assert_eq!(ImpactCategory::normalize(Some("None")), ImpactCategory::NoImpact);
    }

    #[test]
    fn normalize_is_case_insensitive() {
        assert_eq!(ImpactCategory::normalize(Some(" direct ")), ImpactCategory::Direct);
        assert_eq!(ImpactCategory::normalize(Some("INDIRECT")), ImpactCategory::Indirect);
    }

    #[test]
    fn normalize_korean_labels() {
        assert_eq!(ImpactCategory::normalize(Some("직접")), ImpactCategory::Direct);
        assert_eq!(ImpactCategory::normalize(Some("간접")), ImpactCategory::Indirect);
        assert_eq!(ImpactCategory::normalize(Some("없음")), ImpactCategory::NoImpact);
    }

    #[test]
    fn normalize_defaults_to_no_impact() {
        assert_eq!(ImpactCategory::normalize(None), ImpactCategory::NoImpact);
        assert_eq!(ImpactCategory::normalize(Some("")), ImpactCategory::NoImpact);
        assert_eq!(ImpactCategory::normalize(Some("Maybe")), ImpactCategory::NoImpact);
    }

    #[test]
    fn serializes_canonical_label() {
        assert_eq!(
            serde_json::to_string(&ImpactCategory::NoImpact).unwrap(),
            "\"None\""
        );
        assert_eq!(ImpactCategory::Direct.to_string(), "Direct");
    }
}
