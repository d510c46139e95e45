//! Public types for the inkdex API and pipeline.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use crate::utils::config::{POP_TIMEOUT, RETRY_CEILING, default_worker_threads};

/// One file seen during a traversal: its path and modification time in
/// nanoseconds since the epoch. Produced fresh on every scan, never stored.
#[derive(Clone, Debug)]
pub struct FileRecord {
    pub path: PathBuf,
    pub mtime_ns: i64,
}

/// Persisted snapshot shape: path -> last-indexed mtime (ns since epoch).
/// Owned by the external persistence collaborator; the differ only reads it.
pub type Snapshot = HashMap<PathBuf, i64>;

/// Transient file set built by one traversal. Same shape as [`Snapshot`] but
/// reflects the live filesystem, not what was last indexed.
pub type FileSet = HashMap<PathBuf, i64>;

/// Result of comparing the live tree to a snapshot.
///
/// `to_index` holds new or modified paths, `to_delete` paths that vanished
/// from disk. The two lists are disjoint by construction; order carries no
/// meaning.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Diff {
    pub to_index: Vec<PathBuf>,
    pub to_delete: Vec<PathBuf>,
}

impl Diff {
    pub fn is_empty(&self) -> bool {
        self.to_index.is_empty() && self.to_delete.is_empty()
    }
}

/// Page coordinates derived from the last three segments of a job path:
/// `.../<series>/<chapter>/<page>`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRef {
    pub series: String,
    pub chapter: String,
    pub page: String,
}

/// Options for a single scan.
#[derive(Clone, Debug)]
pub struct ScanOpts {
    /// Override stat-worker thread count. When None, derived from rayon.
    pub num_threads: Option<usize>,
    /// Walk with jwalk on the rayon pool (default); false falls back to a
    /// serial walkdir traversal.
    pub parallel_walk: bool,
    /// Follow symbolic links.
    pub follow_links: bool,
    /// Mtime tolerance window in nanoseconds. A file counts as modified only
    /// when its mtime is newer than the snapshot's by more than this. Zero
    /// (the default) means strictly newer.
    pub mtime_window_ns: i64,
    /// Cooperative cancel flag, checked between received records. The walk
    /// winds down promptly once set; the scan returns an error.
    pub cancel: Option<Arc<AtomicBool>>,
}

impl Default for ScanOpts {
    fn default() -> Self {
        Self {
            num_threads: None,
            parallel_walk: true,
            follow_links: false,
            mtime_window_ns: 0,
            cancel: None,
        }
    }
}

/// Options for the worker pool.
#[derive(Clone, Debug)]
pub struct PoolOpts {
    /// Max concurrently active workers. At no instant does the supervisor
    /// let more than this many run.
    pub ceiling: usize,
    /// Attempts per job before it is abandoned.
    pub retry_ceiling: u32,
    /// How long a worker blocks on an empty queue before giving its slot
    /// back. A timeout signals "no work", not an error.
    pub pop_timeout: Duration,
}

impl Default for PoolOpts {
    fn default() -> Self {
        Self {
            ceiling: default_worker_threads(),
            retry_ceiling: RETRY_CEILING,
            pop_timeout: POP_TIMEOUT,
        }
    }
}
