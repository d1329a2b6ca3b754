//! Server half of the state-sync layer: hosts dimensions on a fixed-rate
//! tick loop and streams their state to connected clients.

pub mod clock;
pub mod config;
pub mod console;
pub mod context;
pub mod crash;
pub mod error;
pub mod jobs;
pub mod network;
pub mod persistence;
pub mod profiler;
pub mod scheduler;
pub mod stats;
pub mod tracker;
pub mod world;

pub use context::ServerContext;
pub use error::{PersistenceError, ServerError, SimulationError};
pub use scheduler::{IterationReport, SchedulerState, TickScheduler, TickSettings};
pub use world::{Dimension, FlatWorld};
