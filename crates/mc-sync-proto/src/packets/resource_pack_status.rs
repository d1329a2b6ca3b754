//! ResourcePackStatus (0x19): client to server.

use bytes::{Buf, BufMut};

use crate::codec::{read_string, write_string, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;
use crate::types::VarInt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourcePackResult {
    SuccessfullyLoaded,
    Declined,
    FailedDownload,
    Accepted,
}

impl ResourcePackResult {
    fn to_i32(self) -> i32 {
        match self {
            Self::SuccessfullyLoaded => 0,
            Self::Declined => 1,
            Self::FailedDownload => 2,
            Self::Accepted => 3,
        }
    }

    fn from_i32(v: i32) -> Result<Self, ProtoError> {
        match v {
            0 => Ok(Self::SuccessfullyLoaded),
            1 => Ok(Self::Declined),
            2 => Ok(Self::FailedDownload),
            3 => Ok(Self::Accepted),
            other => Err(ProtoError::InvalidData(format!(
                "unknown resource pack result {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourcePackStatus {
    pub hash: String,
    pub result: ResourcePackResult,
}

impl ProtoEncode for ResourcePackStatus {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        write_string(buf, &self.hash);
        VarInt(self.result.to_i32()).proto_encode(buf);
    }
}

impl ProtoDecode for ResourcePackStatus {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let hash = read_string(buf)?;
        let result = ResourcePackResult::from_i32(VarInt::proto_decode(buf)?.0)?;
        Ok(Self { hash, result })
    }
}
