//! Strategy dispatch over a live room.

use std::sync::Arc;

use platepick_protocol::{RoomId, SelectionStrategy};
use platepick_room::RoomRegistry;
use platepick_suggest::SuggestionProvider;

use crate::strategy::{
    AI_FALLBACK_EXPLANATION, CONSENSUS_EXPLANATION, HIGHEST_VOTES_EXPLANATION,
    RANDOM_EXPLANATION, WEIGHTED_EXPLANATION, find_best_match, random_choice,
    weighted_choice,
};

/// The chosen restaurant and why it was chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub candidate: String,
    pub explanation: String,
}

impl Selection {
    fn new(candidate: String, explanation: impl Into<String>) -> Self {
        Self {
            candidate,
            explanation: explanation.into(),
        }
    }
}

/// Runs selection strategies against rooms in a [`RoomRegistry`].
///
/// Only `AI_RECOMMEND` awaits anything (the provider); the room is
/// snapshotted first, so no registry entry is held across that call.
pub struct SelectionEngine<P> {
    registry: Arc<RoomRegistry>,
    provider: Arc<P>,
}

impl<P> Clone for SelectionEngine<P> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            provider: Arc::clone(&self.provider),
        }
    }
}

impl<P: SuggestionProvider> SelectionEngine<P> {
    pub fn new(registry: Arc<RoomRegistry>, provider: Arc<P>) -> Self {
        Self { registry, provider }
    }

    /// Picks a restaurant for `room_id`.
    ///
    /// `None` only when the room does not exist or has no suggestions.
    pub async fn select(&self, room_id: RoomId, strategy: SelectionStrategy) -> Option<Selection> {
        let Some(room) = self.registry.find_by_id(room_id) else {
            tracing::warn!(%room_id, "selection requested for unknown room");
            return None;
        };
        let suggestions = room.suggestions;
        if suggestions.is_empty() {
            tracing::warn!(%room_id, "no suggestions to select from");
            return None;
        }

        let selection = match strategy {
            SelectionStrategy::Random => self.random(&suggestions),
            SelectionStrategy::WeightedRandom => {
                let leader = self.registry.best_by_counter(room_id);
                weighted_choice(&suggestions, leader.as_deref())
                    .map(|c| Selection::new(c, WEIGHTED_EXPLANATION))
            }
            SelectionStrategy::HighestVotes => self.highest_votes(room_id, &suggestions),
            SelectionStrategy::Consensus => match self.registry.best_by_counter(room_id) {
                Some(leader) => Some(Selection::new(leader, CONSENSUS_EXPLANATION)),
                None => self.highest_votes(room_id, &suggestions),
            },
            SelectionStrategy::AiRecommend => self.ai_recommend(room_id, &suggestions).await,
        };

        if let Some(selection) = &selection {
            tracing::info!(
                %room_id,
                %strategy,
                candidate = %selection.candidate,
                "restaurant selected"
            );
        }
        selection
    }

    fn random(&self, suggestions: &[String]) -> Option<Selection> {
        random_choice(suggestions).map(|c| Selection::new(c, RANDOM_EXPLANATION))
    }

    fn highest_votes(&self, room_id: RoomId, suggestions: &[String]) -> Option<Selection> {
        match self.registry.best_by_counter(room_id) {
            Some(leader) => Some(Selection::new(leader, HIGHEST_VOTES_EXPLANATION)),
            None => self.random(suggestions),
        }
    }

    async fn ai_recommend(&self, room_id: RoomId, suggestions: &[String]) -> Option<Selection> {
        let prompt = format!(
            "Based on these restaurant suggestions: {}, which one would you recommend and why?",
            suggestions.join(", ")
        );

        let lines = match self.provider.suggest(&prompt).await {
            Ok(lines) if !lines.is_empty() => lines,
            Ok(_) => {
                tracing::warn!(%room_id, "AI returned no recommendation, picking at random");
                return self.random(suggestions);
            }
            Err(e) => {
                tracing::warn!(%room_id, error = %e, "AI recommendation failed, picking at random");
                return self.random(suggestions);
            }
        };

        let candidate = find_best_match(&lines[0], suggestions)?;
        let explanation = match lines.get(1) {
            Some(reason) => format!("AI recommended: {reason}"),
            None => AI_FALLBACK_EXPLANATION.to_string(),
        };
        Some(Selection::new(candidate, explanation))
    }
}
