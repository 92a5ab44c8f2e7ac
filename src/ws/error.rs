#![expect(
    clippy::module_name_repetitions,
    reason = "Error types include the module name to indicate their scope"
)]

use std::error::Error as StdError;
use std::fmt;

use crate::error::{Error, Kind};

/// Gateway error variants.
#[non_exhaustive]
#[derive(Debug)]
pub enum WsError {
    /// Error connecting to or communicating with the WebSocket server
    Connection(tokio_tungstenite::tungstenite::Error),
    /// A text frame was not valid JSON, or its payload did not match the expected shape
    MessageParse(serde_json::Error),
    /// WebSocket connection was closed
    ConnectionClosed,
    /// Received a frame that is valid JSON but breaks the protocol, e.g. no `op`
    InvalidMessage(String),
}

impl WsError {
    /// Frame-local errors drop a single frame; everything else concerns the connection.
    #[must_use]
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::MessageParse(_) | Self::InvalidMessage(_))
    }
}

impl fmt::Display for WsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connection(e) => write!(f, "WebSocket connection error: {e}"),
            Self::MessageParse(e) => write!(f, "Failed to parse gateway frame: {e}"),
            Self::ConnectionClosed => write!(f, "WebSocket connection closed"),
            Self::InvalidMessage(msg) => write!(f, "Invalid gateway frame: {msg}"),
        }
    }
}

impl StdError for WsError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Connection(e) => Some(e),
            Self::MessageParse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<WsError> for Error {
    fn from(e: WsError) -> Self {
        let kind = if e.is_decode() {
            Kind::Decode
        } else {
            Kind::WebSocket
        };
        Error::with_source(kind, e)
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for Error {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        Error::with_source(Kind::WebSocket, WsError::Connection(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_variants_map_to_decode_kind() {
        let error: Error = WsError::InvalidMessage("no op".to_owned()).into();
        assert_eq!(error.kind(), Kind::Decode);

        let json_err = serde_json::from_str::<serde_json::Value>("[").unwrap_err();
        let error: Error = WsError::MessageParse(json_err).into();
        assert_eq!(error.kind(), Kind::Decode);
    }

    #[test]
    fn transport_variants_map_to_websocket_kind() {
        let error: Error = WsError::ConnectionClosed.into();
        assert_eq!(error.kind(), Kind::WebSocket);

        let error: Error = tokio_tungstenite::tungstenite::Error::ConnectionClosed.into();
        assert_eq!(error.kind(), Kind::WebSocket);
        assert!(error.downcast_ref::<WsError>().is_some());
    }
}
