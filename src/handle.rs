//! Single-assignment result handles.

use crate::error::{Error, Result};
use crate::task::TaskId;
use crossbeam_channel::Receiver;

/// The consumer side of one submitted task.
///
/// Exactly one producer, the worker that ran the task, writes either the
/// closure's value or its captured panic; `wait` blocks until that write
/// happens. If the pool is torn down with the task still queued, the
/// producer side is dropped and `wait` returns [`Error::TaskAbandoned`].
#[derive(Debug)]
pub struct JobHandle<T> {
    id: TaskId,
    rx: Receiver<Result<T>>,
}

impl<T> JobHandle<T> {
    pub(crate) fn new(id: TaskId, rx: Receiver<Result<T>>) -> Self {
        Self { id, rx }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Whether the executing worker has already delivered a result.
    pub fn is_ready(&self) -> bool {
        !self.rx.is_empty()
    }

    /// Block until the task's result is written, then consume it.
    pub fn wait(self) -> Result<T> {
        match self.rx.recv() {
            Ok(outcome) => outcome,
            Err(_) => Err(Error::TaskAbandoned),
        }
    }
}

/// Drain every handle of a fan-out, in submission order.
///
/// All handles are consumed even when an early one fails, so sibling
/// results are never silently left pending on the pool; the first failure
/// is reported only after the whole batch has been collected.
pub fn wait_all<T>(handles: impl IntoIterator<Item = JobHandle<T>>) -> Result<Vec<T>> {
    let mut values = Vec::new();
    let mut first_err = None;

    for handle in handles {
        match handle.wait() {
            Ok(value) => values.push(value),
            Err(err) => {
                if first_err.is_none() {
                    first_err = Some(err);
                }
            }
        }
    }

    match first_err {
        Some(err) => Err(err),
        None => Ok(values),
    }
}
