//! Seams to the external collaborators: snapshot store, page store, OCR
//! service, search index.
//!
//! The pipeline only consumes these. Production implementations (Postgres,
//! Elasticsearch, the OCR sidecar) live in the embedding application; the
//! test suite and [`crate::snapshot::JsonSnapshotStore`] provide lightweight
//! ones.

use crate::error::{IndexError, ServiceError, StoreError};
use crate::types::{PageRef, Snapshot};

/// Read access to the persisted snapshot.
pub trait SnapshotStore: Send + Sync {
    /// The full snapshot: path -> last-indexed mtime (ns since epoch).
    /// A failure here aborts the whole scan or watch cycle.
    fn load_snapshots(&self) -> Result<Snapshot, StoreError>;
}

/// Durable page-record storage.
pub trait PagePersister: Send + Sync {
    /// Insert the page record keyed by `path`, or update text and timestamp
    /// when it already exists.
    fn upsert(&self, page: &PageRef, path: &str, text: &str) -> Result<(), StoreError>;

    /// Remove the record for `path`, if any.
    fn delete(&self, path: &str) -> Result<(), StoreError>;
}

/// External OCR extraction.
pub trait OcrService: Send + Sync {
    fn extract_text(&self, path: &str) -> Result<String, ServiceError>;
}

/// Full-text index over page records. Indexing the same path again must
/// overwrite the previous document.
pub trait SearchIndexer: Send + Sync {
    fn index_page(&self, page: &PageRef, path: &str, text: &str) -> Result<(), IndexError>;
}
