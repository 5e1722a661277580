//! Unified error type for Platepick.

use platepick_protocol::{ProtocolError, UserId};
use platepick_room::RoomError;
use platepick_suggest::SuggestError;
use platepick_transport::TransportError;

use crate::bus::BusError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum PlatepickError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, malformed vote).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room-level error (not found, duplicate, unknown suggestion).
    #[error(transparent)]
    Room(#[from] RoomError),

    /// The suggestion provider failed.
    #[error(transparent)]
    Suggest(#[from] SuggestError),

    /// Publishing to the message bus failed.
    #[error(transparent)]
    Bus(#[from] BusError),

    /// The user directory has no such user.
    #[error("user {0} not found")]
    UnknownUser(UserId),
}

/// Coarse classification of a [`PlatepickError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    ExternalFailure,
    MalformedInput,
    Transport,
}

impl PlatepickError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport(_) => ErrorKind::Transport,
            Self::Protocol(_) => ErrorKind::MalformedInput,
            Self::Room(RoomError::DuplicateSuggestion { .. }) => ErrorKind::Conflict,
            Self::Room(_) | Self::UnknownUser(_) => ErrorKind::NotFound,
            Self::Suggest(_) | Self::Bus(_) => ErrorKind::ExternalFailure,
        }
    }
}
