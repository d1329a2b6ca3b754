use mc_sync_proto::error::ProtoError;
use mc_sync_tasks::TaskError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("no entity with id {0}")]
    NotFound(i32),
}

/// Recoverable replica inconsistencies. Logged, never fatal.
#[derive(Debug, thiserror::Error)]
pub enum ReplicaError {
    #[error("chunk payload length {actual}, expected {expected}")]
    ChunkLength { expected: usize, actual: usize },
    #[error("unknown objective '{0}'")]
    UnknownObjective(String),
    #[error("unknown team '{0}'")]
    UnknownTeam(String),
    #[error("unknown object type {0}")]
    UnknownObjectType(i8),
    #[error("slot {slot} out of range for window {window_id}")]
    SlotOutOfRange { window_id: i8, slot: i16 },
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Failures that terminate the connection.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("unknown packet id 0x{0:02X}")]
    UnknownPacket(u32),
    #[error("failed to decode packet 0x{id:02X}: {source}")]
    Decode {
        id: u32,
        #[source]
        source: ProtoError,
    },
    #[error("simulation queue rejected packet: {0}")]
    Queue(#[from] TaskError),
}

#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("protocol error: {0}")]
    Proto(#[from] ProtoError),
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
    #[error("connection closed by remote")]
    Closed,
}
