use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    #[error("task queue is closed")]
    QueueClosed,

    #[error("task was cancelled before it ran")]
    Cancelled,

    #[error("task panicked: {0}")]
    Panicked(String),

    #[error("task was dropped without running")]
    Dropped,
}
