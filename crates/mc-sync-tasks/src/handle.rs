use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::oneshot;

use crate::error::TaskError;

/// The submitter's side of a deferred task.
///
/// Dropping the handle does not cancel the task; it only discards the result.
#[derive(Debug)]
pub struct TaskHandle<R> {
    rx: oneshot::Receiver<Result<R, TaskError>>,
    cancelled: Arc<AtomicBool>,
}

impl<R> TaskHandle<R> {
    pub(crate) fn new(
        rx: oneshot::Receiver<Result<R, TaskError>>,
        cancelled: Arc<AtomicBool>,
    ) -> Self {
        Self { rx, cancelled }
    }

    /// Ask the queue to skip this task. Has no effect once the task has started.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Wait for the simulation thread to run the task.
    pub async fn wait(self) -> Result<R, TaskError> {
        self.rx.await.unwrap_or(Err(TaskError::Dropped))
    }

    /// Block the current (non-async) thread until the task has run.
    ///
    /// Never call this from the simulation thread itself; it would wait on its own drain.
    pub fn blocking_wait(self) -> Result<R, TaskError> {
        self.rx.blocking_recv().unwrap_or(Err(TaskError::Dropped))
    }

    /// Poll for a finished result without waiting.
    pub fn try_result(&mut self) -> Option<Result<R, TaskError>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(Err(TaskError::Dropped)),
        }
    }
}
