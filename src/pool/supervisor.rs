//! Supervisor: push the batch, drain with bounded workers, wait for idle.
//!
//! Per drain cycle: PUSHING (enqueue every path) -> DRAINING (while the
//! queue looks non-empty, claim a slot and spawn a one-job worker) ->
//! WAITING (until the active count hits zero) -> DONE. Once the queue is
//! observed empty no new worker is spawned, even while an existing worker is
//! mid-retry; that worker counts as active until it finishes.

use anyhow::anyhow;
use log::{debug, warn};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use super::processor::{PageServices, process_one};
use super::slots::WorkerSlots;
use crate::Result;
use crate::error::JobError;
use crate::queue::JobQueue;
use crate::types::PoolOpts;

/// Outcome of one drain: how much was pushed, finished, and given up on.
#[derive(Debug, Default)]
pub struct DrainReport {
    /// Paths enqueued this cycle. This is the count user-facing scans
    /// report; it says nothing about per-job success.
    pub pushed: usize,
    /// Jobs that completed OCR + persist + index.
    pub processed: usize,
    /// Jobs dropped after the retry ceiling (or a malformed path), paired
    /// with the error from their final attempt. Nothing is requeued.
    pub abandoned: Vec<(String, JobError)>,
}

/// Drives a batch of queued paths through the worker pool.
pub struct Supervisor {
    queue: Arc<JobQueue>,
    services: PageServices,
    opts: PoolOpts,
    slots: Arc<WorkerSlots>,
    next_worker_id: AtomicU64,
}

impl Supervisor {
    pub fn new(queue: Arc<JobQueue>, services: PageServices, opts: PoolOpts) -> Self {
        let slots = Arc::new(WorkerSlots::new(opts.ceiling));
        Self {
            queue,
            services,
            opts,
            slots,
            next_worker_id: AtomicU64::new(0),
        }
    }

    /// Push every path, then drain. Returns only once the queue is empty and
    /// no worker is active; the report lists per-job terminal state.
    pub fn enqueue_and_drain(&self, paths: &[String]) -> Result<DrainReport> {
        let report = Arc::new(Mutex::new(DrainReport::default()));

        for path in paths {
            self.queue.push(path)?;
        }
        report.lock().unwrap().pushed = paths.len();

        // The emptiness check is a hint: a worker may claim the last job
        // between the check and the spawn, in which case the extra worker
        // times out on pop and gives its slot back.
        let mut handles = Vec::new();
        while !self.queue.is_empty() {
            let slot = self.slots.acquire_guard();
            let id = self.next_worker_id.fetch_add(1, Ordering::Relaxed);
            handles.push(self.spawn_worker(id, slot, Arc::clone(&report)));
        }

        self.slots.wait_idle();
        for handle in handles {
            let _ = handle.join();
        }

        let report = Arc::try_unwrap(report)
            .map_err(|_| anyhow!("drain report still shared after join"))?
            .into_inner()
            .unwrap();
        debug!(
            "drain complete: {} pushed, {} processed, {} abandoned",
            report.pushed,
            report.processed,
            report.abandoned.len()
        );
        Ok(report)
    }

    /// Workers currently running. Diagnostic only.
    pub fn active_workers(&self) -> usize {
        self.slots.active()
    }

    fn spawn_worker(
        &self,
        id: u64,
        slot: super::slots::SlotGuard,
        report: Arc<Mutex<DrainReport>>,
    ) -> thread::JoinHandle<()> {
        let queue = Arc::clone(&self.queue);
        let services = self.services.clone();
        let retry_ceiling = self.opts.retry_ceiling;
        let pop_timeout = self.opts.pop_timeout;
        thread::spawn(move || {
            // Slot rides the guard: released when the worker exits, however
            // it exits.
            let _slot = slot;
            run_worker(&queue, &services, id, retry_ceiling, pop_timeout, &report);
        })
    }
}

/// One worker: claim one job (bounded wait), process with retries, exit.
fn run_worker(
    queue: &JobQueue,
    services: &PageServices,
    id: u64,
    retry_ceiling: u32,
    pop_timeout: Duration,
    report: &Mutex<DrainReport>,
) {
    let path = match queue.pop_timeout(pop_timeout) {
        Ok(Some(path)) => path,
        // Queue stayed empty: the batch was thinner than the spawn rate.
        Ok(None) => return,
        Err(err) => {
            warn!("[worker {id}] pop failed: {err:#}");
            return;
        }
    };

    let mut last_err = None;
    for attempt in 1..=retry_ceiling {
        match process_one(services, id, &path) {
            Ok(()) => {
                report.lock().unwrap().processed += 1;
                return;
            }
            Err(err) if !err.is_retriable() => {
                debug!("[worker {id}] dropping {path}: {err}");
                report.lock().unwrap().abandoned.push((path, err));
                return;
            }
            Err(err) => {
                debug!("[worker {id}] attempt {attempt}/{retry_ceiling} failed for {path}: {err}");
                last_err = Some(err);
            }
        }
    }
    if let Some(err) = last_err {
        warn!("[worker {id}] abandoning {path} after {retry_ceiling} attempts: {err}");
        report.lock().unwrap().abandoned.push((path, err));
    }
}
