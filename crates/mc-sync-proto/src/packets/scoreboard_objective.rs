//! ScoreboardObjective (0x3B): server to client.

use bytes::{Buf, BufMut};

use crate::codec::{ensure_remaining, read_string, write_string, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectiveAction {
    /// `render_type` is `"integer"` or `"hearts"`.
    Create {
        display_name: String,
        render_type: String,
    },
    Remove,
    Update {
        display_name: String,
        render_type: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreboardObjective {
    pub name: String,
    pub action: ObjectiveAction,
}

impl ProtoEncode for ScoreboardObjective {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        write_string(buf, &self.name);
        match &self.action {
            ObjectiveAction::Create {
                display_name,
                render_type,
            } => {
                buf.put_i8(0);
                write_string(buf, display_name);
                write_string(buf, render_type);
            }
            ObjectiveAction::Remove => buf.put_i8(1),
            ObjectiveAction::Update {
                display_name,
                render_type,
            } => {
                buf.put_i8(2);
                write_string(buf, display_name);
                write_string(buf, render_type);
            }
        }
    }
}

impl ProtoDecode for ScoreboardObjective {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let name = read_string(buf)?;
        ensure_remaining(buf, 1)?;
        let action = match buf.get_i8() {
            0 => ObjectiveAction::Create {
                display_name: read_string(buf)?,
                render_type: read_string(buf)?,
            },
            1 => ObjectiveAction::Remove,
            2 => ObjectiveAction::Update {
                display_name: read_string(buf)?,
                render_type: read_string(buf)?,
            },
            other => {
                return Err(ProtoError::InvalidData(format!(
                    "unknown objective mode {other}"
                )))
            }
        };
        Ok(Self { name, action })
    }
}
