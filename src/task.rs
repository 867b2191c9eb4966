//! Task representation and execution.

use crate::error::{Error, Result};
use crossbeam_channel::Sender;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::warn;

/// Global task ID counter
static TASK_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

impl TaskId {
    fn next() -> Self {
        TaskId(TASK_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

type JobFn<C> = Box<dyn FnOnce(&mut C) + Send>;

/// One-shot unit of work: the bound closure plus the sending half of its
/// result handle. Consumed exactly once by whichever worker dequeues it.
pub(crate) struct Task<C: 'static> {
    id: TaskId,
    func: JobFn<C>,
}

impl<C: 'static> Task<C> {
    /// Package a closure so that its outcome, value or captured panic,
    /// lands in the paired handle instead of unwinding the worker thread.
    pub(crate) fn new<F, T>(f: F, tx: Sender<Result<T>>) -> Self
    where
        F: FnOnce(&mut C) -> T + Send + 'static,
        T: Send + 'static,
    {
        let id = TaskId::next();
        let func = Box::new(move |ctx: &mut C| {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| f(ctx)));
            let outcome = outcome.map_err(|payload| {
                let msg = panic_message(payload.as_ref());
                warn!(task = ?id, %msg, "task panicked");
                Error::TaskPanicked(msg)
            });
            // The reader may have dropped its handle; the result is
            // simply discarded then.
            let _ = tx.send(outcome);
        });

        Task { id, func }
    }

    pub(crate) fn id(&self) -> TaskId {
        self.id
    }

    /// Execute the task against the worker's context slot.
    pub(crate) fn run(self, ctx: &mut C) {
        (self.func)(ctx)
    }
}

impl<C: 'static> std::fmt::Debug for Task<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task").field("id", &self.id).finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "opaque panic payload".to_string()
    }
}
