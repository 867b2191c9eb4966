//! ctxpool - a resizable worker pool with per-worker context slots.
//!
//! Work is fanned out as one-shot closures across a fixed-at-a-time, but
//! dynamically resizable, set of OS worker threads. Each worker owns a
//! mutable context value that persists across the tasks it executes, and
//! every submission returns a single-assignment [`JobHandle`] the caller
//! blocks on for the result. Two queue backends, a lock-free channel and
//! a mutex/condvar deque, sit behind one contract and are chosen per pool
//! at construction time.
//!
//! # Quick Start
//!
//! ```
//! use ctxpool::ContextPool;
//!
//! let pool: ContextPool = ContextPool::new(4).unwrap();
//!
//! let handles: Vec<_> = (0..8)
//!     .map(|n| pool.submit(move || n * n).unwrap())
//!     .collect();
//!
//! let squares = ctxpool::wait_all(handles).unwrap();
//! assert_eq!(squares.iter().sum::<i32>(), 140);
//! ```
//!
//! # Guarantees
//!
//! - Every submitted task executes exactly once, on some worker, while
//!   the pool has workers and is not stopped; there is no cross-task
//!   ordering guarantee.
//! - A panicking closure surfaces only through its own handle.
//! - Shrinking joins retiring workers synchronously; a dequeued task
//!   always runs to completion.
//! - Tasks still queued at teardown are abandoned, never drained.

#![warn(missing_debug_implementations)]

pub mod backend;
pub mod config;
pub mod error;
pub mod handle;
pub mod pool;

mod task;

pub use backend::BackendKind;
pub use config::{Config, ConfigBuilder};
pub use error::{Error, Result};
pub use handle::{wait_all, JobHandle};
pub use pool::ContextPool;
pub use task::TaskId;
