//! Types shared between game clients and the room relay.

pub mod protocol;

pub use protocol::{RoomMessage, WireMove};
