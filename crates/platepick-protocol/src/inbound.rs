//! Lenient decoders for inbound payloads.
//!
//! Room clients predate the typed frames in [`crate::types`] and still
//! send two loosely-shaped payloads:
//!
//! - the caller's identity on join/leave, as a number, a numeric string,
//!   or raw bytes;
//! - ballots smuggled through the suggest action as
//!   `VOTE:<candidate>:<voter>:<approved>`.

use serde_json::Value;

use crate::{ProtocolError, UserId};

/// Prefix that marks a suggest payload as a ballot.
pub const VOTE_PREFIX: &str = "VOTE:";

/// Normalizes an identity payload to a [`UserId`].
///
/// Numbers are taken as-is (fractions truncated, negatives rejected).
/// Anything else is rendered as text, stripped of every non-digit
/// character, and parsed. A byte array is decoded as text first. Any
/// failure yields [`UserId::NONE`] rather than an error, because a join
/// without a usable identity still refreshes the room view.
///
/// ```rust
/// use platepick_protocol::{UserId, decode_user_id};
/// use serde_json::json;
///
/// assert_eq!(decode_user_id(&json!(42)), UserId(42));
/// assert_eq!(decode_user_id(&json!("\"42\"")), UserId(42));
/// assert_eq!(decode_user_id(&json!("abc")), UserId::NONE);
/// ```
pub fn decode_user_id(payload: &Value) -> UserId {
    match payload {
        Value::Null => UserId::NONE,
        Value::Number(n) => {
            if let Some(id) = n.as_u64() {
                UserId(id)
            } else {
                match n.as_f64() {
                    Some(f) if f.is_finite() && f >= 1.0 && f < u64::MAX as f64 => {
                        UserId(f.trunc() as u64)
                    }
                    _ => UserId::NONE,
                }
            }
        }
        Value::String(s) => digits_to_id(s),
        Value::Array(items) => match bytes_of(items) {
            Some(bytes) => decode_user_id_bytes(&bytes),
            None => digits_to_id(&payload.to_string()),
        },
        other => digits_to_id(&other.to_string()),
    }
}

/// Normalizes an identity sent as raw bytes (e.g. a binary frame body).
pub fn decode_user_id_bytes(bytes: &[u8]) -> UserId {
    digits_to_id(&String::from_utf8_lossy(bytes))
}

/// Returns `true` if a suggest payload is actually a ballot.
pub fn is_vote_message(text: &str) -> bool {
    text.starts_with(VOTE_PREFIX)
}

fn bytes_of(items: &[Value]) -> Option<Vec<u8>> {
    items
        .iter()
        .map(|v| v.as_u64().and_then(|n| u8::try_from(n).ok()))
        .collect()
}

fn digits_to_id(text: &str) -> UserId {
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    digits.parse().map(UserId).unwrap_or(UserId::NONE)
}

// ---------------------------------------------------------------------------
// VoteMessage
// ---------------------------------------------------------------------------

/// A parsed `VOTE:<candidate>:<voter>:<approved>` ballot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteMessage {
    pub candidate: String,
    pub voter: String,
    pub approved: bool,
}

impl VoteMessage {
    /// Parses a ballot.
    ///
    /// Exactly four colon-separated fields are required, the first being
    /// `VOTE`. `approved` is `true` only for the text `true` in any case;
    /// every other value counts as a rejection.
    ///
    /// # Errors
    /// [`ProtocolError::MalformedVote`] on any other shape.
    pub fn parse(raw: &str) -> Result<Self, ProtocolError> {
        let parts: Vec<&str> = raw.split(':').collect();
        match parts.as_slice() {
            ["VOTE", candidate, voter, approved] => Ok(Self {
                candidate: (*candidate).to_string(),
                voter: (*voter).to_string(),
                approved: approved.eq_ignore_ascii_case("true"),
            }),
            _ => Err(ProtocolError::MalformedVote(raw.to_string())),
        }
    }
}
