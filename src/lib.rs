//! Inkdex: manga-library OCR indexing pipeline.
//!
//! Scans an image library in parallel, diffs it against a persisted
//! snapshot, and drains the resulting batch through a durable job queue and
//! a bounded worker pool that calls OCR, persistence, and search indexing
//! behind trait seams. Those collaborators (OCR service, page store, search
//! index) are supplied by the embedding application; see [`service`].

pub mod differ;
pub mod error;
pub mod pool;
pub mod queue;
pub mod service;
pub mod snapshot;
pub mod types;
pub mod utils;
pub mod watcher;

/// Re-export types for API
pub use types::*;

pub use pool::{DrainReport, PageServices, Supervisor};
pub use queue::JobQueue;
pub use watcher::{WatchHandle, Watcher};

/// Result alias used by the public inkdex API
pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

use log::{info, warn};

use service::{PagePersister, SnapshotStore};

/// Outcome of [`sync_library`]. The counts are paths *queued* and *deleted*,
/// not paths successfully indexed; per-job terminal state is in `report`.
#[derive(Debug)]
pub struct SyncSummary {
    pub queued: usize,
    pub deleted: usize,
    pub report: DrainReport,
}

/// Scan once and reconcile: delete stale records, enqueue everything new or
/// modified, and drain the queue to completion.
///
/// Stale-record deletion happens before enqueueing, directly against the
/// persister; a failed delete is logged and skipped so one bad row cannot
/// stall the batch.
pub fn sync_library(
    watcher: &Watcher,
    store: &dyn SnapshotStore,
    persister: &dyn PagePersister,
    supervisor: &Supervisor,
) -> Result<SyncSummary> {
    let diff = watcher.compare(store)?;

    let mut deleted = 0_usize;
    for path in &diff.to_delete {
        let path = path.to_string_lossy();
        match persister.delete(&path) {
            Ok(()) => deleted += 1,
            Err(err) => warn!("delete {path}: {err}"),
        }
    }

    let to_index: Vec<String> = diff
        .to_index
        .iter()
        .map(|p| p.to_string_lossy().into_owned())
        .collect();
    let queued = to_index.len();
    let report = supervisor.enqueue_and_drain(&to_index)?;

    info!("sync: {queued} paths queued, {deleted} stale records removed");
    Ok(SyncSummary {
        queued,
        deleted,
        report,
    })
}
