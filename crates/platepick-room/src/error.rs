//! Error types for the room layer.

use platepick_protocol::{InviteCode, RoomId};

/// Errors that can occur during room operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// No room answers to this invite code.
    #[error("Room not found with invite code: {0}")]
    NotFound(InviteCode),

    /// No room has this id.
    #[error("room {0} not found")]
    RoomNotFound(RoomId),

    /// The exact suggestion text is already in the room.
    #[error("'{name}' is already suggested in room {room_id}")]
    DuplicateSuggestion { room_id: RoomId, name: String },

    /// A counter vote for something nobody suggested.
    #[error("'{name}' is not a suggestion in room {room_id}")]
    UnknownSuggestion { room_id: RoomId, name: String },
}
