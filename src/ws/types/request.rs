use serde::{Serialize, Serializer};
use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::auth::{self, SecretString};

/// Operation codes of the gateway protocol.
///
/// Inbound frames carry arbitrary integers in `op`; only these four have meaning to the session.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum OpCode {
    /// Server hello carrying the heartbeat interval; client identify when sent outbound
    Hello = 0,
    /// Server event, discriminated by the frame's `t` tag
    Event = 1,
    /// Client keepalive ping
    Heartbeat = 9,
    /// Server acknowledgement of a ping
    HeartbeatAck = 10,
}

impl OpCode {
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub const fn from_code(code: u64) -> Option<Self> {
        match code {
            0 => Some(Self::Hello),
            1 => Some(Self::Event),
            9 => Some(Self::Heartbeat),
            10 => Some(Self::HeartbeatAck),
            _ => None,
        }
    }
}

/// A frame written by the client.
#[non_exhaustive]
#[derive(Debug, Clone, Serialize)]
pub struct OutboundFrame<D = ()> {
    pub op: OpCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub d: Option<D>,
}

impl OutboundFrame {
    /// `{"op":9}`
    #[must_use]
    pub const fn ping() -> Self {
        Self {
            op: OpCode::Heartbeat,
            d: None,
        }
    }
}

impl OutboundFrame<Identify> {
    /// `{"op":0,"d":{"auth":"Bearer <token>"}}`
    #[must_use]
    pub fn identify(token: SecretString) -> Self {
        Self {
            op: OpCode::Hello,
            d: Some(Identify { auth: token }),
        }
    }
}

/// Payload of the identify frame. Debug output redacts the token.
#[non_exhaustive]
#[derive(Debug, Clone, Serialize)]
pub struct Identify {
    #[serde(serialize_with = "serialize_bearer")]
    pub auth: SecretString,
}

fn serialize_bearer<S: Serializer>(token: &SecretString, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&auth::bearer(token))
}
