//! The suggestion capability.

use std::future::Future;
use std::sync::Arc;

use crate::SuggestError;

/// Turns a free-text prompt into an ordered list of restaurant names.
///
/// Implementations may call the network and may fail; they must not
/// panic. `Send + Sync + 'static` because one provider is shared by every
/// room session for the lifetime of the server.
///
/// # Example
///
/// ```rust
/// use platepick_suggest::{SuggestError, SuggestionProvider};
///
/// /// Always suggests the same place.
/// struct OnlyPizza;
///
/// impl SuggestionProvider for OnlyPizza {
///     async fn suggest(&self, _prompt: &str) -> Result<Vec<String>, SuggestError> {
///         Ok(vec!["Pizza Hut".to_string()])
///     }
/// }
/// ```
pub trait SuggestionProvider: Send + Sync + 'static {
    /// Asks for restaurant names matching `prompt`, best first.
    fn suggest(
        &self,
        prompt: &str,
    ) -> impl Future<Output = Result<Vec<String>, SuggestError>> + Send;
}

impl<P: SuggestionProvider> SuggestionProvider for Arc<P> {
    fn suggest(
        &self,
        prompt: &str,
    ) -> impl Future<Output = Result<Vec<String>, SuggestError>> + Send {
        (**self).suggest(prompt)
    }
}
