use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Describes the import that produced the current snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadMetadata {
    pub filename: String,
    pub uploaded_at: DateTime<Utc>,
    pub total_records: usize,
}
