//! Watcher: one-shot scans and a periodic background compare.

use crossbeam_channel::{Sender, bounded, select, tick};
use log::warn;
use std::path::PathBuf;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::Result;
use crate::differ;
use crate::service::SnapshotStore;
use crate::types::{Diff, ScanOpts};

/// Compares the live tree under `root` against a persisted snapshot.
pub struct Watcher {
    root: PathBuf,
    opts: ScanOpts,
}

impl Watcher {
    pub fn new(root: impl Into<PathBuf>, opts: ScanOpts) -> Self {
        Self {
            root: root.into(),
            opts,
        }
    }

    /// Scan once and diff. A snapshot-load failure aborts the cycle and
    /// surfaces here; traversal problems stay best-effort.
    pub fn compare(&self, store: &dyn SnapshotStore) -> Result<Diff> {
        let snapshot = store.load_snapshots()?;
        let current = differ::scan_files(&self.root, &self.opts)?;
        Ok(differ::diff(&current, &snapshot, self.opts.mtime_window_ns))
    }

    /// One-shot: diff, hand the result to `on_compare`, return the diff.
    /// Used at startup and for manual rebuilds.
    pub fn scan<F>(&self, store: &dyn SnapshotStore, mut on_compare: F) -> Result<Diff>
    where
        F: FnMut(&Diff),
    {
        let diff = self.compare(store)?;
        on_compare(&diff);
        Ok(diff)
    }

    /// Start the periodic loop: every `interval`, diff and invoke the
    /// callback. A failed cycle is logged and skipped; the next tick runs as
    /// usual. Stop through the returned handle (or by dropping it, which
    /// closes the stop channel); an in-flight cycle always finishes first.
    pub fn start<S, F>(self, store: S, interval: Duration, mut on_compare: F) -> WatchHandle
    where
        S: SnapshotStore + 'static,
        F: FnMut(&Diff) + Send + 'static,
    {
        let (stop_tx, stop_rx) = bounded::<()>(1);
        let handle = thread::spawn(move || {
            let ticker = tick(interval);
            loop {
                select! {
                    recv(ticker) -> _ => {
                        match self.compare(&store) {
                            Ok(diff) => on_compare(&diff),
                            Err(err) => warn!("watch cycle failed: {err:#}"),
                        }
                    }
                    recv(stop_rx) -> _ => break,
                }
            }
        });
        WatchHandle { stop_tx, handle }
    }
}

/// Handle to a running watch loop.
pub struct WatchHandle {
    stop_tx: Sender<()>,
    handle: JoinHandle<()>,
}

impl WatchHandle {
    /// Signal stop and wait for the loop to exit. The stop takes effect
    /// between cycles; a diff + callback already underway runs to completion
    /// before this returns.
    pub fn stop(self) {
        let _ = self.stop_tx.send(());
        let _ = self.handle.join();
    }
}
