//! The pool controller and worker loop.

use crate::backend::{self, TaskQueue};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::handle::JobHandle;
use crate::task::Task;
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, trace};

/// A resizable pool of OS worker threads, each owning one mutable context
/// slot of type `C`, fed from a single queue backend.
///
/// Submitted closures run exactly once on some worker; each submission
/// returns a [`JobHandle`] the caller blocks on for the result. Failures
/// inside a closure are captured into that task's handle and never affect
/// the worker thread or sibling tasks.
///
/// # Context slots
///
/// Slot `i` belongs to worker `i`: it is handed to every context-aware
/// task that worker executes, created via `C::default()` when a grow
/// brings index `i` into existence and dropped when a shrink retires it.
/// Each slot sits behind its own mutex, so external access through
/// [`ContextPool::with_context`] cannot race the worker at the memory
/// level; for *meaningful* reads the caller must still quiesce the pool
/// first (no in-flight task on that slot), which the pool does not
/// enforce.
///
/// # Example
///
/// ```
/// use ctxpool::ContextPool;
///
/// let pool: ContextPool = ContextPool::new(4).unwrap();
/// let handle = pool.submit(|| 2 + 2).unwrap();
/// assert_eq!(handle.wait().unwrap(), 4);
/// ```
///
/// Context-aware submission, one accumulator per worker:
///
/// ```
/// use ctxpool::ContextPool;
///
/// let pool: ContextPool<u64> = ContextPool::new(2).unwrap();
/// let handle = pool.submit_with(|acc| {
///     *acc += 1;
///     *acc
/// });
/// assert!(handle.unwrap().wait().unwrap() >= 1);
/// ```
pub struct ContextPool<C = ()>
where
    C: Default + Send + 'static,
{
    shared: Arc<Shared<C>>,
    /// Worker handles, position-aligned with worker indices. The mutex
    /// doubles as the structural lock: resize and shutdown serialize on
    /// it, submission does not.
    workers: Mutex<Vec<WorkerHandle>>,
}

struct WorkerHandle {
    index: usize,
    thread: JoinHandle<()>,
}

struct Shared<C: 'static> {
    queue: Arc<dyn TaskQueue<C>>,
    slots: RwLock<Vec<Arc<Mutex<C>>>>,
    stop: AtomicBool,
    /// Published worker count; every worker re-reads it each iteration
    /// to learn whether its index has been retired by a shrink.
    size: AtomicUsize,
    config: Config,
}

impl<C> ContextPool<C>
where
    C: Default + Send + 'static,
{
    /// Build a running pool with `num_threads` workers and the default
    /// backend.
    pub fn new(num_threads: usize) -> Result<Self> {
        Self::with_config(Config {
            num_threads: Some(num_threads),
            ..Config::default()
        })
    }

    pub fn with_config(config: Config) -> Result<Self> {
        config.validate()?;
        let num_threads = config.worker_threads();

        let pool = Self {
            shared: Arc::new(Shared {
                queue: backend::make_queue(config.backend),
                slots: RwLock::new(Vec::new()),
                stop: AtomicBool::new(false),
                size: AtomicUsize::new(0),
                config,
            }),
            workers: Mutex::new(Vec::new()),
        };

        pool.resize(num_threads)?;
        Ok(pool)
    }

    /// Submit a context-oblivious closure.
    ///
    /// Fails with [`Error::PoolStopped`] after teardown, before the task
    /// reaches the queue.
    pub fn submit<F, T>(&self, f: F) -> Result<JobHandle<T>>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        self.submit_with(move |_ctx| f())
    }

    /// Submit a closure that receives a mutable reference to the
    /// executing worker's context slot.
    pub fn submit_with<F, T>(&self, f: F) -> Result<JobHandle<T>>
    where
        F: FnOnce(&mut C) -> T + Send + 'static,
        T: Send + 'static,
    {
        if self.shared.stop.load(Ordering::Acquire) {
            return Err(Error::PoolStopped);
        }

        let (tx, rx) = crossbeam_channel::bounded(1);
        let task = Task::new(f, tx);
        let id = task.id();
        self.shared.queue.push(task);
        Ok(JobHandle::new(id, rx))
    }

    /// Change the worker count.
    ///
    /// Growing appends fresh context slots and spawns one worker per new
    /// index; it returns as soon as the threads exist. Shrinking publishes
    /// the new size first and then joins every retiring worker, so it
    /// blocks for up to one poll interval plus the tail of any in-flight
    /// task; the retired slots are dropped afterwards. A task submitted
    /// concurrently with a shrink may still be executed by a worker that
    /// has not yet observed the new size; that race is benign and
    /// deliberate.
    pub fn resize(&self, new_size: usize) -> Result<()> {
        // Structural lock: concurrent resizes must not interleave.
        let mut workers = self.workers.lock();

        if self.shared.stop.load(Ordering::Acquire) {
            return Err(Error::PoolStopped);
        }

        let old_size = self.shared.size.load(Ordering::Acquire);

        if new_size < old_size {
            self.shared.size.store(new_size, Ordering::Release);
            self.shared.queue.wake_all();

            for handle in workers.drain(new_size..) {
                trace!(worker = handle.index, "joining retired worker");
                let _ = handle.thread.join();
            }
            self.shared.slots.write().truncate(new_size);
        } else if new_size > old_size {
            self.shared
                .slots
                .write()
                .resize_with(new_size, || Arc::new(Mutex::new(C::default())));
            self.shared.size.store(new_size, Ordering::Release);

            for index in old_size..new_size {
                match self.spawn_worker(index) {
                    Ok(handle) => workers.push(handle),
                    Err(err) => {
                        // Roll back to the workers that actually exist.
                        self.shared.size.store(index, Ordering::Release);
                        self.shared.slots.write().truncate(index);
                        return Err(err);
                    }
                }
            }
        }

        debug!(old = old_size, new = new_size, "pool resized");
        Ok(())
    }

    fn spawn_worker(&self, index: usize) -> Result<WorkerHandle> {
        let shared = Arc::clone(&self.shared);
        let name = format!("{}-{}", self.shared.config.thread_name_prefix, index);

        let mut builder = thread::Builder::new().name(name);
        if let Some(stack_size) = self.shared.config.stack_size {
            builder = builder.stack_size(stack_size);
        }

        let thread = builder
            .spawn(move || worker_loop(shared, index))
            .map_err(Error::Spawn)?;

        Ok(WorkerHandle { index, thread })
    }

    /// Current worker count.
    pub fn size(&self) -> usize {
        self.shared.size.load(Ordering::Acquire)
    }

    /// Approximate number of tasks waiting in the queue. Best-effort
    /// under the channel backend.
    pub fn queue_depth(&self) -> usize {
        self.shared.queue.len()
    }

    /// Run `f` against worker `index`'s context slot.
    ///
    /// The slot mutex keeps this memory-safe against a running worker,
    /// but the value observed is only meaningful while the pool is
    /// quiesced for that slot.
    pub fn with_context<F, R>(&self, index: usize, f: F) -> Result<R>
    where
        F: FnOnce(&mut C) -> R,
    {
        let slots = self.shared.slots.read();
        let slot = slots.get(index).ok_or(Error::BadIndex {
            index,
            size: slots.len(),
        })?;
        let mut ctx = slot.lock();
        Ok(f(&mut ctx))
    }

    /// Clone worker `index`'s current context value.
    pub fn get_context(&self, index: usize) -> Result<C>
    where
        C: Clone,
    {
        self.with_context(index, |ctx| ctx.clone())
    }

    /// Replace worker `index`'s context value.
    pub fn set_context(&self, index: usize, context: C) -> Result<()> {
        self.with_context(index, move |slot| *slot = context)
    }

    /// Stop the pool: set the stop flag and join every worker.
    ///
    /// Tasks still queued are abandoned, never drained; their handles
    /// resolve to [`Error::TaskAbandoned`]. A worker mid-task finishes
    /// that task first. Idempotent, and also run on drop.
    pub fn shutdown(&self) {
        let mut workers = self.workers.lock();

        self.shared.stop.store(true, Ordering::Release);
        self.shared.queue.wake_all();

        for handle in workers.drain(..) {
            trace!(worker = handle.index, "joining worker at shutdown");
            let _ = handle.thread.join();
        }
    }
}

impl<C> std::fmt::Debug for ContextPool<C>
where
    C: Default + Send + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextPool")
            .field("size", &self.size())
            .field("queue_depth", &self.queue_depth())
            .field("stopped", &self.shared.stop.load(Ordering::Relaxed))
            .finish()
    }
}

impl<C> Drop for ContextPool<C>
where
    C: Default + Send + 'static,
{
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Per-thread routine for worker `index`.
///
/// Loops until the stop flag is set or the index falls out of the
/// published size; both are only checked between dequeues, so a task
/// already picked up always runs to completion.
fn worker_loop<C: Send + 'static>(shared: Arc<Shared<C>>, index: usize) {
    trace!(worker = index, "worker started");

    loop {
        if shared.stop.load(Ordering::Acquire) || index >= shared.size.load(Ordering::Acquire) {
            break;
        }

        let task = match shared.queue.pop_timeout(shared.config.poll_interval) {
            Some(task) => task,
            None => continue,
        };

        // Slot `index` outlives this worker: a shrink truncates the slot
        // vector only after joining the workers it retires.
        let slot = match shared.slots.read().get(index) {
            Some(slot) => Arc::clone(slot),
            None => break,
        };

        let mut ctx = slot.lock();
        task.run(&mut ctx);
    }

    trace!(worker = index, "worker exiting");
}
