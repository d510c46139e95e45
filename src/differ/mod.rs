//! Snapshot differ: one parallel traversal into a transient path -> mtime
//! map, compared against the persisted snapshot.
//!
//! Traversal is a streaming pipeline: a walk thread feeds candidate paths to
//! stat workers over bounded channels, and the calling thread collects
//! [`FileRecord`](crate::types::FileRecord)s into the file set. The diff
//! itself is a pure function over two maps.

mod pipeline;
mod walk;

pub use walk::is_image_path;

use anyhow::anyhow;
use crossbeam_channel::{RecvTimeoutError, bounded};
use log::debug;
use std::path::Path;
use std::sync::atomic::Ordering;
use std::time::Duration;

use crate::Result;
use crate::types::{Diff, FileSet, ScanOpts, Snapshot};
use crate::utils::config::{STREAMING_CHANNEL_CAP, default_worker_threads};

/// Traverse `root` and return path -> mtime_ns for every recognized image
/// file. Each call fully replaces the previous file set; nothing is cached
/// between runs. Duplicate keys collapse last-writer-wins (paths from one
/// walk are unique, so this should not occur).
pub fn scan_files(root: &Path, opts: &ScanOpts) -> Result<FileSet> {
    let (path_tx, path_rx) = bounded(STREAMING_CHANNEL_CAP);
    let (record_tx, record_rx) = bounded(STREAMING_CHANNEL_CAP);
    let num_threads = opts.num_threads.unwrap_or_else(default_worker_threads);

    let walk_handle = walk::spawn_walk_thread(
        path_tx,
        root.to_path_buf(),
        opts.follow_links,
        opts.parallel_walk,
    );
    let worker_handles = pipeline::spawn_stat_workers(path_rx, &record_tx, num_threads);
    // Last sender gone: the collect loop ends when walk and workers do.
    drop(record_tx);

    let mut current = FileSet::new();
    let mut cancelled = false;
    match &opts.cancel {
        None => {
            while let Ok(record) = record_rx.recv() {
                current.insert(record.path, record.mtime_ns);
            }
        }
        Some(flag) => loop {
            if flag.load(Ordering::Relaxed) {
                cancelled = true;
                break;
            }
            match record_rx.recv_timeout(Duration::from_millis(200)) {
                Ok(record) => {
                    current.insert(record.path, record.mtime_ns);
                }
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        },
    }
    // Hanging up on the record channel winds down walk + workers if we left
    // early; join either way so no thread outlives the scan.
    drop(record_rx);

    let walked = walk_handle
        .join()
        .map_err(|_| anyhow!("walk thread panicked"))?;
    for handle in worker_handles {
        let _ = handle.join();
    }

    if cancelled {
        return Err(anyhow!("scan cancelled"));
    }
    debug!(
        "scan: {} image files recorded ({} candidate paths walked)",
        current.len(),
        walked
    );
    Ok(current)
}

/// Apply the diff rules to a scanned file set and a persisted snapshot.
/// The two output lists are disjoint by construction.
pub fn diff(current: &FileSet, snapshot: &Snapshot, mtime_window_ns: i64) -> Diff {
    let mut out = Diff::default();
    for (path, mtime_ns) in current {
        match snapshot.get(path) {
            // On disk, never indexed.
            None => out.to_index.push(path.clone()),
            // Known path: reindex only when strictly newer than recorded,
            // beyond the tolerance window. Equal or older is a no-op so
            // rescans stay idempotent.
            Some(saved) => {
                if *mtime_ns > saved.saturating_add(mtime_window_ns) {
                    out.to_index.push(path.clone());
                }
            }
        }
    }
    for path in snapshot.keys() {
        if !current.contains_key(path) {
            out.to_delete.push(path.clone());
        }
    }
    out
}
