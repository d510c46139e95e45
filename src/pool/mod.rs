//! Worker pool: supervisor, slot accounting, per-job processor.

pub mod processor;
pub mod slots;
pub mod supervisor;

pub use processor::{PageServices, process_one, split_page_path};
pub use slots::WorkerSlots;
pub use supervisor::{DrainReport, Supervisor};
