//! Picks one restaurant out of a room's suggestions.
//!
//! [`SelectionEngine`] applies a [`SelectionStrategy`] to a room and
//! returns the winner together with a human-readable explanation. Every
//! strategy degrades to a uniform random pick rather than failing, so the
//! only "no result" case is a room with nothing to choose from.
//!
//! [`SelectionStrategy`]: platepick_protocol::SelectionStrategy

mod engine;
mod strategy;

pub use engine::{Selection, SelectionEngine};
pub use strategy::{
    AI_FALLBACK_EXPLANATION, CONSENSUS_EXPLANATION, HIGHEST_VOTES_EXPLANATION,
    RANDOM_EXPLANATION, WEIGHTED_EXPLANATION, find_best_match, weighted_pick,
};
