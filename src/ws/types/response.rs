use std::time::Duration;

use bon::Builder;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::request::OpCode;
use crate::Result;
use crate::types::{Album, Artist, Source};
use crate::ws::error::WsError;

/// `t` tag of an [`OpCode::Event`] frame announcing the song now playing.
pub const TRACK_UPDATE: &str = "TRACK_UPDATE";

/// Events delivered to the registered [`crate::ws::EventHandler`].
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// The station started playing a new song
    SongUpdate(SongUpdate),
    /// Any other frame, passed through exactly as received
    Generic(Value),
}

impl Event {
    #[must_use]
    pub fn as_song_update(&self) -> Option<&SongUpdate> {
        match self {
            Self::SongUpdate(update) => Some(update),
            Self::Generic(_) => None,
        }
    }

    #[must_use]
    pub fn as_generic(&self) -> Option<&Value> {
        match self {
            Self::Generic(raw) => Some(raw),
            Self::SongUpdate(_) => None,
        }
    }
}

/// The song carried by a `TRACK_UPDATE` frame (`d.song`).
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Builder)]
#[builder(on(String, into))]
pub struct SongUpdate {
    pub title: String,
    pub artists: Vec<Artist>,
    pub albums: Vec<Album>,
    pub sources: Vec<Source>,
}

#[derive(Deserialize)]
struct TrackUpdatePayload {
    song: SongUpdate,
}

/// One JSON frame received from the gateway.
///
/// Only `op` is validated up front; the payload is inspected lazily by the accessor the session
/// needs for that operation.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundFrame {
    op: u64,
    raw: Value,
}

impl InboundFrame {
    /// Parse a text frame. Malformed JSON and frames without an integer `op` are decode errors.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let raw: Value = serde_json::from_slice(bytes).map_err(WsError::MessageParse)?;
        Self::from_value(raw)
    }

    pub fn from_value(raw: Value) -> Result<Self> {
        let op = raw
            .get("op")
            .and_then(Value::as_u64)
            .ok_or_else(|| WsError::InvalidMessage("frame has no integer `op`".to_owned()))?;

        Ok(Self { op, raw })
    }

    #[must_use]
    pub fn op(&self) -> u64 {
        self.op
    }

    /// `None` for operation codes the session does not know.
    #[must_use]
    pub fn op_code(&self) -> Option<OpCode> {
        OpCode::from_code(self.op)
    }

    /// The `t` tag, present on event frames.
    #[must_use]
    pub fn tag(&self) -> Option<&str> {
        self.raw.get("t").and_then(Value::as_str)
    }

    #[must_use]
    pub fn payload(&self) -> Option<&Value> {
        self.raw.get("d")
    }

    #[must_use]
    pub fn is_track_update(&self) -> bool {
        self.op_code() == Some(OpCode::Event) && self.tag() == Some(TRACK_UPDATE)
    }

    /// Heartbeat interval announced by a hello frame (`d.heartbeat`, in milliseconds).
    pub fn heartbeat_interval(&self) -> Result<Duration> {
        let millis = self
            .payload()
            .and_then(|d| d.get("heartbeat"))
            .and_then(Value::as_u64)
            .ok_or_else(|| {
                WsError::InvalidMessage("hello frame has no integer `d.heartbeat`".to_owned())
            })?;

        if millis == 0 {
            return Err(
                WsError::InvalidMessage("heartbeat interval must be positive".to_owned()).into(),
            );
        }

        Ok(Duration::from_millis(millis))
    }

    /// Decode into an [`Event`]. See [`decode`].
    pub fn into_event(self) -> Result<Event> {
        if !self.is_track_update() {
            return Ok(Event::Generic(self.raw));
        }

        let payload = self.raw.get("d").unwrap_or(&Value::Null);
        let TrackUpdatePayload { song } =
            TrackUpdatePayload::deserialize(payload).map_err(WsError::MessageParse)?;

        Ok(Event::SongUpdate(song))
    }

    #[must_use]
    pub fn into_raw(self) -> Value {
        self.raw
    }
}

/// Classify a gateway frame.
///
/// `{"op":1,"t":"TRACK_UPDATE"}` frames become [`Event::SongUpdate`], with every field of
/// `d.song` required; anything else becomes [`Event::Generic`] holding `raw` unmodified. Pure
/// function: no I/O and no shared state.
pub fn decode(raw: Value) -> Result<Event> {
    InboundFrame::from_value(raw)?.into_event()
}
