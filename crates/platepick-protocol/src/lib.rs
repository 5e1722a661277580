//! Wire protocol for Platepick.
//!
//! This crate defines the "language" that room clients and the server
//! speak:
//!
//! - **Types** ([`RoomEvent`], [`ClientAction`], [`ClientFrame`],
//!   [`ServerFrame`], identity newtypes): what travels on the wire.
//! - **Inbound decoding** ([`decode_user_id`], [`VoteMessage`]): the
//!   lenient parsers for payloads older clients still send.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how frames become bytes.
//! - **Errors** ([`ProtocolError`]).
//!
//! # Architecture
//!
//! ```text
//! Transport (bytes) → Protocol (ClientFrame) → Session (room mutations)
//!                                                   ↓
//! Transport (bytes) ← Protocol (ServerFrame) ← Bus (RoomEvent per topic)
//! ```
//!
//! The protocol layer knows nothing about rooms or votes beyond their
//! shapes.

mod codec;
mod error;
mod inbound;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use inbound::{
    VOTE_PREFIX, VoteMessage, decode_user_id, decode_user_id_bytes,
    is_vote_message,
};
pub use types::{
    ClientAction, ClientFrame, InviteCode, RoomEvent, RoomId,
    SelectionStrategy, ServerFrame, UserId, VoteSnapshot, room_topic,
};
