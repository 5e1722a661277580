//! Error types for suggestion providers.

/// Why a provider could not produce suggestions.
///
/// None of these are fatal to a room: callers either fall back to the
/// catalog ([`WithFallback`](crate::WithFallback)) or add nothing.
#[derive(Debug, thiserror::Error)]
pub enum SuggestError {
    /// The HTTP request itself failed (connect, timeout, bad status).
    #[cfg(feature = "openai")]
    #[error("suggestion request failed: {0}")]
    Http(#[source] reqwest::Error),

    /// The provider answered, but with nothing we can use.
    #[error("provider returned no usable suggestions")]
    EmptyResponse,

    /// Any other provider-side failure.
    #[error("suggestion provider failed: {0}")]
    Provider(String),
}
