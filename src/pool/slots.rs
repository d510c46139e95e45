//! Worker-slot accounting: one condvar-guarded counter, owned by the
//! supervisor and never handed to callers.

use std::sync::{Arc, Condvar, Mutex};

/// Bounds concurrently active workers at a fixed ceiling. Acquire blocks on
/// a condvar until a slot frees up; there is no sleep-loop polling between
/// slot availability and dispatch.
pub struct WorkerSlots {
    active: Mutex<usize>,
    changed: Condvar,
    ceiling: usize,
}

impl WorkerSlots {
    pub fn new(ceiling: usize) -> Self {
        Self {
            active: Mutex::new(0),
            changed: Condvar::new(),
            ceiling: ceiling.max(1),
        }
    }

    /// Block until active < ceiling, then claim a slot.
    pub fn acquire(&self) {
        let mut active = self.active.lock().unwrap();
        while *active >= self.ceiling {
            active = self.changed.wait(active).unwrap();
        }
        *active += 1;
    }

    /// Acquire and wrap in a guard that releases on drop, panics included.
    pub fn acquire_guard(self: &Arc<Self>) -> SlotGuard {
        self.acquire();
        SlotGuard(Arc::clone(self))
    }

    /// Return a slot and wake anyone blocked in acquire or wait_idle.
    pub fn release(&self) {
        let mut active = self.active.lock().unwrap();
        debug_assert!(*active > 0);
        *active = active.saturating_sub(1);
        drop(active);
        self.changed.notify_all();
    }

    /// Block until every claimed slot has been released.
    pub fn wait_idle(&self) {
        let mut active = self.active.lock().unwrap();
        while *active > 0 {
            active = self.changed.wait(active).unwrap();
        }
    }

    pub fn active(&self) -> usize {
        *self.active.lock().unwrap()
    }

    pub fn ceiling(&self) -> usize {
        self.ceiling
    }
}

/// RAII slot claim from [`WorkerSlots::acquire_guard`].
pub struct SlotGuard(Arc<WorkerSlots>);

impl Drop for SlotGuard {
    fn drop(&mut self) {
        self.0.release();
    }
}
