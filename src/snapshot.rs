//! File-backed snapshot store: a JSON map of path -> mtime_ns.
//!
//! The production snapshot lives wherever page records do; this
//! implementation serves embedders without such a store, and the test suite.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::StoreError;
use crate::service::SnapshotStore;
use crate::types::Snapshot;

/// Snapshot persisted as a single pretty-printed JSON object.
pub struct JsonSnapshotStore {
    path: PathBuf,
}

impl JsonSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the whole snapshot, replacing the file.
    pub fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let map: HashMap<String, i64> = snapshot
            .iter()
            .map(|(path, mtime_ns)| (path.to_string_lossy().into_owned(), *mtime_ns))
            .collect();
        let data = serde_json::to_vec_pretty(&map).map_err(StoreError::new)?;
        fs::write(&self.path, data).map_err(StoreError::new)
    }
}

impl SnapshotStore for JsonSnapshotStore {
    /// A missing file reads as an empty snapshot (first run).
    fn load_snapshots(&self) -> Result<Snapshot, StoreError> {
        if !self.path.exists() {
            return Ok(Snapshot::new());
        }
        let data = fs::read(&self.path).map_err(StoreError::new)?;
        let map: HashMap<String, i64> = serde_json::from_slice(&data).map_err(StoreError::new)?;
        Ok(map
            .into_iter()
            .map(|(path, mtime_ns)| (PathBuf::from(path), mtime_ns))
            .collect())
    }
}
