// manager/manager.rs
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::Notify;

use crate::manager::queue::{Queue, QueueStats};

/// Bounds how many submissions run in the sandbox at once.
#[derive(Debug, Clone)]
pub struct ExecutionManager {
    queue: Arc<Mutex<Queue>>,
}

impl ExecutionManager {
    pub fn new(max_concurrent: usize) -> Self {
        Self {
            queue: Arc::new(Mutex::new(Queue::new(max_concurrent))),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Queue> {
        // Queue updates never panic midway, so a poisoned lock still holds valid counts.
        self.queue.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Waits for a free slot. The slot is released when the returned guard drops,
    /// including when the waiting future itself is dropped.
    pub async fn acquire(&self) -> Slot {
        let maybe_notify = self.lock().try_acquire_slot();

        let mut slot = Slot {
            manager: self.clone(),
            waiting_on: maybe_notify.clone(),
        };

        // Wait outside the lock; the slot is already ours once notified.
        if let Some(notify) = maybe_notify {
            tracing::debug!(waiting = self.stats().waiting, "Submission queued");
            notify.notified().await;
            slot.waiting_on = None;
        }

        slot
    }

    /// Runs `job` once a slot is free.
    pub async fn run<F: Future>(&self, job: F) -> F::Output {
        let _slot = self.acquire().await;
        job.await
    }

    pub fn stats(&self) -> QueueStats {
        self.lock().stats()
    }
}

/// A held (or awaited) run slot.
#[derive(Debug)]
pub struct Slot {
    manager: ExecutionManager,
    waiting_on: Option<Arc<Notify>>,
}

impl Drop for Slot {
    fn drop(&mut self) {
        let mut queue = self.manager.lock();
        match &self.waiting_on {
            Some(notify) if queue.cancel(notify) => {}
            _ => queue.release_slot(),
        }
    }
}
