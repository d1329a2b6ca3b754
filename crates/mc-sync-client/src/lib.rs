//! Client half of the state-sync layer: a replica of one server world kept
//! current from play-state packets.

pub mod config;
pub mod dispatch;
pub mod entity;
pub mod error;
pub mod handler;
pub mod mutator;
pub mod net;
pub mod outbound;
pub mod registry;
pub mod replica;
pub mod resource;
pub mod session;

pub use dispatch::{Dispatched, InboundDispatcher, PacketSink, QueueSink};
pub use error::{ConnectionError, DispatchError, RegistryError, ReplicaError};
pub use handler::PlayHandler;
pub use registry::EntityRegistry;
pub use replica::WorldReplica;
pub use session::ClientSession;
