use crate::types::QueuedTask;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;

/// Unbounded FIFO of submitted tasks.
///
/// Safe for concurrent `push` from many submitters while one consumer pops.
/// Insertion order is processing order; priority never reorders it.
#[derive(Debug, Default)]
pub struct TaskQueue {
    items: Mutex<VecDeque<QueuedTask>>,
    available: Notify,
}

impl TaskQueue {
    /// Empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a task to the back of the queue.
    pub fn push(&self, item: QueuedTask) {
        self.items.lock().push_back(item);
        self.available.notify_one();
    }

    /// Take the front task without waiting.
    pub fn try_pop(&self) -> Option<QueuedTask> {
        self.items.lock().pop_front()
    }

    /// Take the front task, waiting at most `wait` for one to arrive.
    pub async fn pop_timeout(&self, wait: Duration) -> Option<QueuedTask> {
        let deadline = Instant::now() + wait;
        loop {
            if let Some(item) = self.try_pop() {
                return Some(item);
            }
            // A push between the check above and this wait leaves a stored
            // permit, so the wakeup is not lost.
            if tokio::time::timeout_at(deadline, self.available.notified())
                .await
                .is_err()
            {
                return self.try_pop();
            }
        }
    }

    /// Number of queued tasks.
    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    /// `true` when nothing is waiting.
    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }
}
