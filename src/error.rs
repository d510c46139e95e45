//! Job error taxonomy.
//!
//! Per-job failures are classified so the worker knows what to retry; scan
//! level plumbing uses the crate [`Result`](crate::Result) alias instead.

use std::time::Duration;
use thiserror::Error;

/// OCR call failure. Always worth another attempt.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("ocr request failed: {0}")]
    Request(String),
    #[error("ocr request timed out after {0:?}")]
    Timeout(Duration),
    #[error("bad ocr response: {0}")]
    BadResponse(String),
}

/// Persistence failure: page store or snapshot load. Retriable.
#[derive(Debug, Error)]
#[error("store error: {0}")]
pub struct StoreError(pub String);

impl StoreError {
    pub fn new(err: impl std::fmt::Display) -> Self {
        Self(err.to_string())
    }
}

/// Search-index failure. Retriable; indexing is idempotent by overwrite.
#[derive(Debug, Error)]
#[error("index error: {0}")]
pub struct IndexError(pub String);

impl IndexError {
    pub fn new(err: impl std::fmt::Display) -> Self {
        Self(err.to_string())
    }
}

/// Why one job attempt failed.
#[derive(Debug, Error)]
pub enum JobError {
    /// Fewer than three path segments: the job can never succeed and is
    /// dropped without retry.
    #[error("malformed page path {path:?}: {reason}")]
    PathFormat { path: String, reason: &'static str },
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Index(#[from] IndexError),
}

impl JobError {
    /// Everything but a malformed path is worth another attempt.
    pub fn is_retriable(&self) -> bool {
        !matches!(self, JobError::PathFormat { .. })
    }
}
