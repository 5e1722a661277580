//! Error types for the protocol layer.
//!
//! Each crate in Platepick defines its own error enum. A `ProtocolError`
//! always means the problem is in the bytes or text a client sent (or in
//! serializing our reply), never in room state.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a frame into bytes).
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed: malformed JSON, a missing field, or an
    /// unknown `type` tag.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The frame parsed but violates a protocol rule.
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// A `VOTE:` message without exactly four colon-separated fields.
    #[error("malformed vote message: {0}")]
    MalformedVote(String),
}
