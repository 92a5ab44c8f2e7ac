pub mod request;
pub mod response;

pub use request::{Identify, OpCode, OutboundFrame};
pub use response::{Event, InboundFrame, SongUpdate, TRACK_UPDATE, decode};
