//manager/queue.rs
use std::collections::VecDeque;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Notify;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueStats {
    pub running: usize,
    pub waiting: usize,
    pub max_concurrent: usize,
}

/// FIFO admission queue: at most `max_concurrent` holders run at once and the
/// rest are woken in arrival order.
#[derive(Debug)]
pub struct Queue {
    max_concurrent: usize,
    running: usize,
    waiting: VecDeque<Arc<Notify>>,
}

impl Queue {
    pub fn new(max_concurrent: usize) -> Self {
        Self {
            max_concurrent: max_concurrent.max(1),
            running: 0,
            waiting: VecDeque::new(),
        }
    }

    /// Takes a slot if one is free. Otherwise returns the notifier that fires
    /// once a slot has been handed over to this waiter.
    pub fn try_acquire_slot(&mut self) -> Option<Arc<Notify>> {
        if self.running < self.max_concurrent && self.waiting.is_empty() {
            self.running += 1;
            None
        } else {
            let notify = Arc::new(Notify::new());
            self.waiting.push_back(notify.clone());
            Some(notify)
        }
    }

    /// Frees a slot, passing it straight to the oldest waiter if there is one.
    pub fn release_slot(&mut self) {
        self.running = self.running.saturating_sub(1);

        if let Some(waiting_task) = self.waiting.pop_front() {
            self.running += 1;
            waiting_task.notify_one();
        }
    }

    /// Withdraws a waiter that gave up. Returns `false` if it was already
    /// handed a slot, which the caller then owns and must release.
    pub fn cancel(&mut self, notify: &Arc<Notify>) -> bool {
        match self.waiting.iter().position(|w| Arc::ptr_eq(w, notify)) {
            Some(index) => {
                self.waiting.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn stats(&self) -> QueueStats {
        QueueStats {
            running: self.running,
            waiting: self.waiting.len(),
            max_concurrent: self.max_concurrent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hands_slots_to_waiters_in_arrival_order() {
        let mut queue = Queue::new(1);
        assert!(queue.try_acquire_slot().is_none());
        let first = queue.try_acquire_slot().unwrap();
        let second = queue.try_acquire_slot().unwrap();
        assert_eq!(
            queue.stats(),
            QueueStats {
                running: 1,
                waiting: 2,
                max_concurrent: 1
            }
        );

        queue.release_slot();
        assert!(!queue.cancel(&first), "first waiter already owns the slot");
        assert!(queue.cancel(&second));
        assert_eq!(queue.stats().running, 1);
        assert_eq!(queue.stats().waiting, 0);
    }

    #[test]
    fn zero_capacity_is_treated_as_one() {
        let mut queue = Queue::new(0);
        assert!(queue.try_acquire_slot().is_none());
        assert!(queue.try_acquire_slot().is_some());
    }
}
