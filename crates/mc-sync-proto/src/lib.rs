//! Minecraft Java Edition (protocol 47) play-state messages and wire types.

pub mod codec;
pub mod compression;
pub mod error;
pub mod frame;
pub mod item_stack;
pub mod metadata;
pub mod packets;
pub mod types;
