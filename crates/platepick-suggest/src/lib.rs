//! Restaurant suggestion providers for Platepick.
//!
//! The room engine treats "ask an AI for restaurant names" as an external
//! capability that may fail at any time. This crate defines that
//! capability ([`SuggestionProvider`]) and the pieces that make it safe
//! to depend on:
//!
//! - [`FallbackCatalog`]: a fixed list of chains, filtered by prompt
//!   keywords. Never fails.
//! - [`WithFallback`]: wraps any provider and substitutes the catalog
//!   whenever the provider errors.
//! - [`OpenAiSuggester`] (feature `openai`, on by default): a
//!   chat-completions client.

mod error;
mod fallback;
#[cfg(feature = "openai")]
mod openai;
mod provider;

pub use error::SuggestError;
pub use fallback::{FALLBACK_LIMIT, FALLBACK_RESTAURANTS, FallbackCatalog, WithFallback};
#[cfg(feature = "openai")]
pub use openai::{OpenAiConfig, OpenAiSuggester, parse_suggestion_lines};
pub use provider::SuggestionProvider;
