//! Lock-based backend: mutex-guarded deque plus a condition variable.

use super::TaskQueue;
use crate::task::Task;
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::time::Duration;

pub(crate) struct LockedQueue<C: 'static> {
    queue: Mutex<VecDeque<Task<C>>>,
    cond: Condvar,
}

impl<C: 'static> LockedQueue<C> {
    pub(crate) fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            cond: Condvar::new(),
        }
    }
}

impl<C: Send + 'static> TaskQueue<C> for LockedQueue<C> {
    fn push(&self, task: Task<C>) {
        let mut queue = self.queue.lock();
        queue.push_back(task);
        drop(queue);
        self.cond.notify_one();
    }

    fn pop_timeout(&self, timeout: Duration) -> Option<Task<C>> {
        let mut queue = self.queue.lock();
        if queue.is_empty() {
            // Bounded wait; a spurious or timed-out wakeup just returns
            // None and the worker loop re-checks stop/size.
            self.cond.wait_for(&mut queue, timeout);
        }
        queue.pop_front()
    }

    fn len(&self) -> usize {
        self.queue.lock().len()
    }

    fn wake_all(&self) {
        self.cond.notify_all();
    }
}
