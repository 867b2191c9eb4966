pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// `submit` was called after the pool was torn down.
    #[error("submit on a stopped pool")]
    PoolStopped,

    /// A context-slot accessor was given an out-of-range worker index.
    #[error("worker context index {index} out of range (pool size {size})")]
    BadIndex { index: usize, size: usize },

    /// The task's closure panicked. Delivered only through that task's
    /// own handle; the worker thread and its siblings keep running.
    #[error("task panicked: {0}")]
    TaskPanicked(String),

    /// The pool was torn down while the task was still queued; it will
    /// never execute and its handle will never hold a value.
    #[error("task abandoned before execution")]
    TaskAbandoned,

    /// A worker thread could not be spawned.
    #[error("failed to spawn worker thread: {0}")]
    Spawn(std::io::Error),

    #[error("config error: {0}")]
    Config(String),
}

impl Error {
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }
}
