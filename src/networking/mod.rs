//! Online play
//!
//! - `channel` - [`RoomChannel`] trait, room codes and the in-process relay
//! - `client` - [`OnlineAdapter`] connecting a room to a game session

pub mod channel;
pub mod client;

pub use channel::{
    ChannelError, ChannelResult, LocalRoomHub, MemberId, RoomChannel, RoomCode, RoomSubscription,
};
pub use client::{OnlineAdapter, RoomEvent};
