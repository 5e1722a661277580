//! Core protocol types for Platepick's wire format.
//!
//! Everything here is serialized as JSON. Field and tag spellings of
//! [`RoomEvent`] follow what existing room clients already parse
//! (`UPDATE`/`VOTE`/`SELECTION`/`ERROR`, camelCase fields), so renaming a
//! Rust field must never change its serde name.

use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A registered user's numeric identity.
///
/// `UserId(0)` is reserved for "no user": it is what
/// [`decode_user_id`](crate::decode_user_id) returns for payloads that
/// carry no digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl UserId {
    /// The "no user" sentinel.
    pub const NONE: UserId = UserId(0);

    /// Returns `true` unless this is the "no user" sentinel.
    pub fn is_some(&self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "U-{}", self.0)
    }
}

/// The numeric identity of a room, assigned by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub u64);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R-{}", self.0)
    }
}

/// The human-shareable code members use to find a room.
///
/// Serialized as a plain string. `Borrow<str>` lets maps keyed by
/// `InviteCode` be queried with a `&str` straight from a client frame.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InviteCode(String);

impl InviteCode {
    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for InviteCode {
    fn from(code: String) -> Self {
        Self(code)
    }
}

impl From<&str> for InviteCode {
    fn from(code: &str) -> Self {
        Self(code.to_string())
    }
}

impl Borrow<str> for InviteCode {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for InviteCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InviteCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Returns the bus topic that carries every event for a room.
///
/// ```rust
/// assert_eq!(platepick_protocol::room_topic("AB12CD"), "room.AB12CD");
/// ```
pub fn room_topic(invite_code: &str) -> String {
    format!("room.{invite_code}")
}

// ---------------------------------------------------------------------------
// SelectionStrategy
// ---------------------------------------------------------------------------

/// How the selection engine turns suggestions (and votes) into a winner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SelectionStrategy {
    /// Uniform pick among suggestions.
    Random,
    /// Roulette pick where the current counter leader weighs 3, others 1.
    WeightedRandom,
    /// The counter leader, or a random pick if nobody voted.
    HighestVotes,
    /// Same leader lookup as `HighestVotes`, with its own explanation and
    /// a fallback through the `HighestVotes` path.
    Consensus,
    /// Ask the AI provider and match its answer against the suggestions.
    AiRecommend,
}

impl SelectionStrategy {
    /// Every strategy, in declaration order.
    pub const ALL: [SelectionStrategy; 5] = [
        Self::Random,
        Self::WeightedRandom,
        Self::HighestVotes,
        Self::Consensus,
        Self::AiRecommend,
    ];

    /// The wire name, e.g. `"WEIGHTED_RANDOM"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Random => "RANDOM",
            Self::WeightedRandom => "WEIGHTED_RANDOM",
            Self::HighestVotes => "HIGHEST_VOTES",
            Self::Consensus => "CONSENSUS",
            Self::AiRecommend => "AI_RECOMMEND",
        }
    }
}

impl fmt::Display for SelectionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// RoomEvent: what subscribers of a room topic receive
// ---------------------------------------------------------------------------

/// Voter → approval, ordered by voter so snapshots compare and print
/// deterministically.
pub type VoteSnapshot = BTreeMap<String, bool>;

/// An event broadcast on a room's topic.
///
/// Internally tagged: `{ "type": "UPDATE", "participantCount": 2, ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum RoomEvent {
    /// Fresh membership and suggestion list. Sent after every join,
    /// leave, suggestion and AI suggestion.
    #[serde(rename = "UPDATE")]
    Update {
        participant_count: usize,
        #[serde(rename = "isReady")]
        ready: bool,
        participants: Vec<String>,
        #[serde(rename = "restaurantSuggestions")]
        suggestions: Vec<String>,
    },

    /// Something went wrong, or a vote round was rejected.
    #[serde(rename = "ERROR")]
    Error { message: String },

    /// The current ballot of an approval round.
    #[serde(rename = "VOTE")]
    VoteUpdate {
        room_code: InviteCode,
        #[serde(rename = "selectedRestaurant")]
        candidate: String,
        votes: VoteSnapshot,
    },

    /// A restaurant was picked.
    #[serde(rename = "SELECTION")]
    Selection {
        #[serde(rename = "selectedRestaurant")]
        candidate: String,
        #[serde(rename = "selectionExplanation")]
        explanation: String,
        room_code: InviteCode,
    },
}

impl RoomEvent {
    /// Shorthand for an `Error` event.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// The wire tag, handy for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Update { .. } => "UPDATE",
            Self::Error { .. } => "ERROR",
            Self::VoteUpdate { .. } => "VOTE",
            Self::Selection { .. } => "SELECTION",
        }
    }
}

// ---------------------------------------------------------------------------
// Client → server
// ---------------------------------------------------------------------------

/// An action a client performs on a room identified by invite code.
///
/// `Join` and `Leave` carry the caller's identity as a raw JSON value:
/// older clients send a number, a numeric string, or a byte array. Use
/// [`decode_user_id`](crate::decode_user_id) to normalize it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ClientAction {
    Join {
        #[serde(default)]
        user: serde_json::Value,
    },
    Leave {
        #[serde(default)]
        user: serde_json::Value,
    },
    /// Propose a restaurant. A name starting with `VOTE:` is a ballot.
    Suggest { name: String },
    AiSuggest { prompt: String },
    StartVote { candidate: String },
    SelectRestaurant { strategy: SelectionStrategy },
}

impl ClientAction {
    /// The wire tag, handy for log fields.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Join { .. } => "join",
            Self::Leave { .. } => "leave",
            Self::Suggest { .. } => "suggest",
            Self::AiSuggest { .. } => "ai-suggest",
            Self::StartVote { .. } => "start-vote",
            Self::SelectRestaurant { .. } => "select-restaurant",
        }
    }
}

/// Every frame a gateway client can send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientFrame {
    /// Start receiving the room's events.
    Subscribe { invite_code: InviteCode },
    /// Stop receiving the room's events.
    Unsubscribe { invite_code: InviteCode },
    /// Create a room founded by `creator`. Answered with `RoomCreated`.
    CreateRoom { creator: UserId },
    /// Perform an action on a room. Results arrive on the room topic.
    Action {
        invite_code: InviteCode,
        action: ClientAction,
    },
    /// Bump the legacy counter for a suggestion. Answered with `Voted`.
    CastVote { room_id: RoomId, candidate: String },
    /// Ask for the counter leader. Answered with `Best`.
    BestRestaurant { room_id: RoomId },
    /// Keep-alive. Answered with `Pong`.
    Ping,
}

// ---------------------------------------------------------------------------
// Server → client
// ---------------------------------------------------------------------------

/// Every frame the gateway sends to a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerFrame {
    /// The subscription is live; later events on `topic` will follow.
    Subscribed { topic: String },
    /// A room event delivered to this subscriber.
    Event { topic: String, event: RoomEvent },
    RoomCreated {
        room_id: RoomId,
        invite_code: InviteCode,
    },
    Voted {
        room_id: RoomId,
        candidate: String,
        count: u32,
    },
    Best {
        room_id: RoomId,
        candidate: Option<String>,
    },
    Pong,
    /// A direct error for this connection (bad frame, unknown room id).
    Error { message: String },
}
