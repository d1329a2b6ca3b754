//! Hand-off queue from I/O and helper threads onto the simulation thread.
//!
//! Any thread may [`TaskQueue::submit`] a closure; the simulation thread runs every queued
//! closure in FIFO order at a fixed point of its step via [`TaskQueue::drain`]. Each task
//! runs under its own panic guard and its outcome is delivered through a [`TaskHandle`].

mod error;
mod handle;
mod queue;

pub use error::TaskError;
pub use handle::TaskHandle;
pub use queue::TaskQueue;
