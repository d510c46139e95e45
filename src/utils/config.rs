//! Tuning constants and defaults. One place.

use std::time::Duration;

/// Recognized page-image extensions, matched case-insensitively.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Attempts per job before it is abandoned.
pub const RETRY_CEILING: u32 = 3;

/// How long a worker blocks on an empty queue before releasing its slot.
pub const POP_TIMEOUT: Duration = Duration::from_secs(5);

/// Queue name used when the embedder does not pick one.
pub const DEFAULT_QUEUE_NAME: &str = "ocr_queue";

/// Path and record channel capacity. Large enough that the walk rarely
/// blocks on send for typical libraries; bounded so a pathological tree
/// cannot buffer without limit.
pub const STREAMING_CHANNEL_CAP: usize = 50_000;

/// Stat-worker count when `ScanOpts.num_threads` is unset: the rayon pool
/// width, floored at 2 so serial machines still overlap stat with the walk.
pub fn default_worker_threads() -> usize {
    rayon::current_num_threads().max(2)
}
