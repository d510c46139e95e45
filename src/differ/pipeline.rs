//! Stat workers: turn walked paths into [`FileRecord`]s.

use crossbeam_channel::{Receiver, Sender};
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};
use std::time::UNIX_EPOCH;

use crate::types::FileRecord;

/// Stat one path. `None` for anything that is not a readable regular file;
/// the traversal is best-effort and races with live mutations.
fn stat_record(path: &Path) -> Option<FileRecord> {
    let meta = std::fs::metadata(path).ok()?;
    if !meta.is_file() {
        return None;
    }
    let mtime_ns = meta
        .modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_nanos() as i64)
        .unwrap_or(0);
    Some(FileRecord {
        path: path.to_path_buf(),
        mtime_ns,
    })
}

/// Single stat worker: read paths, emit records. Exits when the path channel
/// closes, or early when the record receiver hangs up (scan cancelled); the
/// early exit drops `path_rx`, which in turn unblocks the walk.
fn stat_worker_loop(path_rx: Receiver<PathBuf>, record_tx: Sender<FileRecord>) {
    while let Ok(path) = path_rx.recv() {
        if let Some(record) = stat_record(&path)
            && record_tx.send(record).is_err()
        {
            break;
        }
    }
    drop(record_tx);
}

/// Spawn `num_threads` stat workers. The caller must drop its own sender
/// clone afterwards so the record channel closes once the walk ends.
pub fn spawn_stat_workers(
    path_rx: Receiver<PathBuf>,
    record_tx: &Sender<FileRecord>,
    num_threads: usize,
) -> Vec<JoinHandle<()>> {
    (0..num_threads)
        .map(|_| {
            let path_rx = path_rx.clone();
            let record_tx = record_tx.clone();
            thread::spawn(move || stat_worker_loop(path_rx, record_tx))
        })
        .collect()
}
