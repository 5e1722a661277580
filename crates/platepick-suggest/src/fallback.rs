//! The keyword-filtered fallback catalog.

use rand::seq::SliceRandom;

use crate::{SuggestError, SuggestionProvider};

/// How many names the catalog returns at most.
pub const FALLBACK_LIMIT: usize = 6;

/// Well-known chains used when no AI provider is reachable.
pub const FALLBACK_RESTAURANTS: [&str; 28] = [
    "McDonald's",
    "Burger King",
    "Wendy's",
    "Chipotle",
    "Olive Garden",
    "Red Lobster",
    "Outback Steakhouse",
    "The Cheesecake Factory",
    "Applebee's",
    "Chili's",
    "TGI Fridays",
    "P.F. Chang's",
    "California Pizza Kitchen",
    "Texas Roadhouse",
    "Ruth's Chris Steak House",
    "Maggiano's",
    "Panera Bread",
    "Panda Express",
    "KFC",
    "Taco Bell",
    "Subway",
    "Domino's Pizza",
    "Pizza Hut",
    "Papa John's",
    "Five Guys",
    "In-N-Out Burger",
    "Shake Shack",
    "Dairy Queen",
];

/// A fixed restaurant list, filtered by the prompt's keywords.
///
/// Words longer than three characters are keywords. A restaurant matches
/// when its lowercased name contains any keyword. Matches are returned in
/// catalog order; more than [`FALLBACK_LIMIT`] matches (or none at all)
/// are shuffled and cut to the limit.
#[derive(Debug, Clone)]
pub struct FallbackCatalog {
    entries: Vec<String>,
    limit: usize,
}

impl Default for FallbackCatalog {
    fn default() -> Self {
        Self::new(FALLBACK_RESTAURANTS.iter().map(|s| s.to_string()).collect())
    }
}

impl FallbackCatalog {
    /// A catalog over custom entries, with the default limit.
    pub fn new(entries: Vec<String>) -> Self {
        Self {
            entries,
            limit: FALLBACK_LIMIT,
        }
    }

    /// Overrides the maximum number of names returned.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Picks names for `prompt`. Never fails, never returns more than the
    /// limit.
    pub fn pick(&self, prompt: &str) -> Vec<String> {
        let keywords = keywords(prompt);
        let mut matched: Vec<String> = self
            .entries
            .iter()
            .filter(|name| {
                let lowered = name.to_lowercase();
                keywords.iter().any(|k| lowered.contains(k.as_str()))
            })
            .cloned()
            .collect();

        if matched.is_empty() {
            matched = self.entries.clone();
            matched.shuffle(&mut rand::rng());
            matched.truncate(self.limit);
        } else if matched.len() > self.limit {
            matched.shuffle(&mut rand::rng());
            matched.truncate(self.limit);
        }
        matched
    }
}

fn keywords(prompt: &str) -> Vec<String> {
    prompt
        .to_lowercase()
        .split_whitespace()
        .filter(|word| word.chars().count() > 3)
        .map(str::to_string)
        .collect()
}

impl SuggestionProvider for FallbackCatalog {
    async fn suggest(&self, prompt: &str) -> Result<Vec<String>, SuggestError> {
        Ok(self.pick(prompt))
    }
}

/// A provider that answers from the catalog whenever `primary` fails.
///
/// A successful primary answer is passed through untouched, even when it
/// is empty.
#[derive(Debug, Clone)]
pub struct WithFallback<P> {
    primary: P,
    fallback: FallbackCatalog,
}

impl<P: SuggestionProvider> WithFallback<P> {
    pub fn new(primary: P) -> Self {
        Self {
            primary,
            fallback: FallbackCatalog::default(),
        }
    }

    pub fn with_catalog(primary: P, fallback: FallbackCatalog) -> Self {
        Self { primary, fallback }
    }
}

impl<P: SuggestionProvider> SuggestionProvider for WithFallback<P> {
    async fn suggest(&self, prompt: &str) -> Result<Vec<String>, SuggestError> {
        match self.primary.suggest(prompt).await {
            Ok(names) => Ok(names),
            Err(e) => {
                tracing::warn!(error = %e, "suggestion provider failed, using fallback catalog");
                Ok(self.fallback.pick(prompt))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Failing;

    impl SuggestionProvider for Failing {
        async fn suggest(&self, _prompt: &str) -> Result<Vec<String>, SuggestError> {
            Err(SuggestError::Provider("offline".into()))
        }
    }

    struct Fixed(Vec<String>);

    impl SuggestionProvider for Fixed {
        async fn suggest(&self, _prompt: &str) -> Result<Vec<String>, SuggestError> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_pizza_prompt_matches_pizza_places_in_catalog_order() {
        let picked = FallbackCatalog::default().pick("cheap pizza please");
        assert_eq!(
            picked,
            vec![
                "California Pizza Kitchen".to_string(),
                "Domino's Pizza".to_string(),
                "Pizza Hut".to_string(),
            ]
        );
    }

    #[test]
    fn test_short_words_are_not_keywords() {
        // "kfc" has three letters and is ignored, so nothing matches.
        let catalog = FallbackCatalog::default();
        let picked = catalog.pick("kfc");
        assert_eq!(picked.len(), FALLBACK_LIMIT);
        for name in &picked {
            assert!(catalog.entries().contains(name));
        }
    }

    #[test]
    fn test_no_match_returns_random_sample_of_limit() {
        let catalog = FallbackCatalog::default();
        let picked = catalog.pick("something entirely unrelated");
        assert_eq!(picked.len(), FALLBACK_LIMIT);

        let mut unique = picked.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), picked.len());
    }

    #[test]
    fn test_many_matches_are_cut_to_limit() {
        let entries: Vec<String> = (0..10).map(|i| format!("Burger Place {i}")).collect();
        let catalog = FallbackCatalog::new(entries.clone());
        let picked = catalog.pick("burger");
        assert_eq!(picked.len(), FALLBACK_LIMIT);
        assert!(picked.iter().all(|p| entries.contains(p)));
    }

    #[test]
    fn test_custom_limit() {
        let catalog = FallbackCatalog::default().with_limit(2);
        assert_eq!(catalog.pick("").len(), 2);
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let picked = FallbackCatalog::default().pick("STEAKHOUSE");
        assert_eq!(picked, vec!["Outback Steakhouse".to_string()]);
    }

    #[tokio::test]
    async fn test_with_fallback_substitutes_catalog_on_error() {
        let provider = WithFallback::new(Failing);
        let names = provider.suggest("tacos and burritos").await.unwrap();
        assert!(!names.is_empty());
        assert!(names.len() <= FALLBACK_LIMIT);
    }

    #[tokio::test]
    async fn test_with_fallback_passes_through_success() {
        let provider = WithFallback::new(Fixed(vec!["Local Diner".into()]));
        let names = provider.suggest("anything").await.unwrap();
        assert_eq!(names, vec!["Local Diner".to_string()]);
    }
}
