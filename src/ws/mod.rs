//! listen.moe event gateway.
//!
//! The gateway is a WebSocket that pushes JSON text frames tagged by an integer `op`:
//!
//! | op | direction | meaning |
//! |----|-----------|---------|
//! | 0  | server → client | hello, carries the heartbeat interval in milliseconds |
//! | 0  | client → server | identify, sent when a login token is stored |
//! | 1  | server → client | event; `t: "TRACK_UPDATE"` announces a new song |
//! | 9  | client → server | heartbeat ping |
//! | 10 | server → client | heartbeat acknowledgement |
//!
//! # Architecture
//!
//! - [`Session`]: owns the socket lifecycle, answers hello with a heartbeat, dispatches every
//!   other frame to the registered [`EventHandler`], and reconnects per [`config::Config`]
//! - [`HandlerRegistry`]: the single handler slot
//! - [`heartbeat`]: the cancellable ping task bound to one socket
//! - [`decode`]: pure classification of a frame into an [`Event`]

pub mod config;
pub mod connection;
pub mod error;
pub mod handler;
pub mod heartbeat;
pub mod types;

pub use connection::{ConnectionState, Disconnect, FrameSender, Session};
#[expect(
    clippy::module_name_repetitions,
    reason = "WsError includes module name for clarity when used outside this module"
)]
pub use error::WsError;
pub use handler::{EventHandler, HandlerRegistry};
pub use heartbeat::HeartbeatHandle;
pub use types::{Event, SongUpdate, decode};
