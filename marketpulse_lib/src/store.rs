//! Record snapshot storage.
//!
//! The core never mutates records one at a time: an import produces a whole
//! new snapshot that replaces the previous one. Readers hold an
//! `Arc<Vec<Record>>` so a replace in flight never shows them a mix of old and
//! new rows.

use std::convert::Infallible;
use std::sync::{Arc, RwLock};

use crate::types::{Record, UploadMetadata};

/// An immutable view of every record at one point in time.
pub type Snapshot = Arc<Vec<Record>>;

/// Source of the flat record collection consumed by the filter and
/// aggregation pipeline.
pub trait DataSource {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Returns the current full snapshot.
    fn get_all(&self) -> Result<Snapshot, Self::Error>;

    /// Atomically swaps the snapshot.
    fn replace_all(&self, records: Vec<Record>) -> Result<(), Self::Error>;

    /// Describes the import that produced the current snapshot, if any.
    fn metadata(&self) -> Result<Option<UploadMetadata>, Self::Error>;

    fn set_metadata(&self, metadata: UploadMetadata) -> Result<(), Self::Error>;

    /// Swaps the snapshot and records the import that produced it. The
    /// default writes the two one after the other; stores that can write
    /// both atomically override it.
    fn replace_snapshot(
        &self,
        records: Vec<Record>,
        metadata: UploadMetadata,
    ) -> Result<(), Self::Error> {
        self.replace_all(records)?;
        self.set_metadata(metadata)
    }
}

/// Thread-safe in-memory store with replace-pointer semantics.
#[derive(Default)]
pub struct MemoryStore {
    snapshot: RwLock<Snapshot>,
    metadata: RwLock<Option<UploadMetadata>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store already holding `records`.
    pub fn with_records(records: Vec<Record>) -> Self {
        Self {
            snapshot: RwLock::new(Arc::new(records)),
            metadata: RwLock::new(None),
        }
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn snapshot(&self) -> Snapshot {
        // A poisoned lock still holds a complete Arc; the swap itself cannot
        // be observed half-done.
        match self.snapshot.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }
}

impl DataSource for MemoryStore {
    type Error = Infallible;

    fn get_all(&self) -> Result<Snapshot, Self::Error> {
        Ok(self.snapshot())
    }

    fn replace_all(&self, records: Vec<Record>) -> Result<(), Self::Error> {
        let next = Arc::new(records);
        let count = next.len();
        match self.snapshot.write() {
            Ok(mut guard) => *guard = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
        tracing::info!("replaced record snapshot ({} records)", count);
        Ok(())
    }

    fn metadata(&self) -> Result<Option<UploadMetadata>, Self::Error> {
        Ok(match self.metadata.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        })
    }

    fn set_metadata(&self, metadata: UploadMetadata) -> Result<(), Self::Error> {
        match self.metadata.write() {
            Ok(mut guard) => *guard = Some(metadata),
            Err(poisoned) => *poisoned.into_inner() = Some(metadata),
        }
        Ok(())
    }
}
