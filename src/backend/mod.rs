//! Pluggable queue backends.
//!
//! Both strategies share one capability set: a push that never blocks the
//! submitter, and a bounded blocking dequeue so idle workers neither spin
//! nor sleep past a stop/shrink signal. A pool picks one concrete backend
//! at construction time and never mixes them.

mod channel;
mod locked;

use crate::task::Task;
use std::sync::Arc;
use std::time::Duration;

pub(crate) use channel::ChannelQueue;
pub(crate) use locked::LockedQueue;

/// Queue strategy selected at pool construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    /// Lock-free MPMC channel; dequeue blocks on the channel's native
    /// timed receive.
    #[default]
    Channel,
    /// Mutex-guarded deque with a condition variable; dequeue waits with
    /// a bounded timeout and is re-checked by the worker loop.
    Locked,
}

/// The backend contract. Hand-off guarantees (every pushed task observed
/// by exactly one pop) come from the underlying primitives.
pub(crate) trait TaskQueue<C: 'static>: Send + Sync {
    fn push(&self, task: Task<C>);

    /// Returns a task if one becomes available within `timeout`, `None`
    /// otherwise so the caller can re-check pool state and retry.
    fn pop_timeout(&self, timeout: Duration) -> Option<Task<C>>;

    /// Approximate pending-task count; may be stale under concurrency.
    fn len(&self) -> usize;

    /// Wake idle waiters so a stop/shrink signal is observed promptly.
    fn wake_all(&self) {}
}

pub(crate) fn make_queue<C: Send + 'static>(kind: BackendKind) -> Arc<dyn TaskQueue<C>> {
    match kind {
        BackendKind::Channel => Arc::new(ChannelQueue::new()),
        BackendKind::Locked => Arc::new(LockedQueue::new()),
    }
}
