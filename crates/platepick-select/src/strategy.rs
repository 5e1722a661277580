//! Pure selection helpers. No room access, no I/O.

use rand::Rng;
use rand::seq::IndexedRandom;

pub const RANDOM_EXPLANATION: &str = "Randomly selected from all suggestions";
pub const WEIGHTED_EXPLANATION: &str = "Selected with weighted randomization based on votes";
pub const HIGHEST_VOTES_EXPLANATION: &str = "Selected based on highest number of votes";
pub const CONSENSUS_EXPLANATION: &str = "Selected based on group consensus";
pub const AI_FALLBACK_EXPLANATION: &str = "AI recommended based on all suggestions";

/// Extra weight the counter leader gets on top of the base weight of 1.
const LEADER_BONUS: u32 = 2;

pub(crate) fn random_choice(suggestions: &[String]) -> Option<String> {
    suggestions.choose(&mut rand::rng()).cloned()
}

pub(crate) fn weighted_choice(suggestions: &[String], leader: Option<&str>) -> Option<String> {
    let total = total_weight(suggestions, leader);
    if total == 0 {
        return None;
    }
    let roll = rand::rng().random_range(1..=total);
    weighted_pick(suggestions, leader, roll)
}

fn weight(name: &str, leader: Option<&str>) -> u32 {
    if leader == Some(name) { 1 + LEADER_BONUS } else { 1 }
}

fn total_weight(suggestions: &[String], leader: Option<&str>) -> u32 {
    suggestions.iter().map(|s| weight(s, leader)).sum()
}

/// Roulette-wheel pick over `suggestions` in their listed order.
///
/// Every suggestion weighs 1 and `leader` weighs 3. `roll` is a 1-based
/// position on the wheel; a roll past the end lands on the first
/// suggestion.
pub fn weighted_pick(suggestions: &[String], leader: Option<&str>, roll: u32) -> Option<String> {
    let mut cumulative = 0;
    for name in suggestions {
        cumulative += weight(name, leader);
        if roll <= cumulative {
            return Some(name.clone());
        }
    }
    suggestions.first().cloned()
}

/// Maps free AI text onto one of the room's suggestions.
///
/// The first suggestion whose lowercased text appears inside the
/// lowercased AI text wins; otherwise the first suggestion.
pub fn find_best_match(ai_text: &str, suggestions: &[String]) -> Option<String> {
    let haystack = ai_text.to_lowercase();
    suggestions
        .iter()
        .find(|s| haystack.contains(&s.to_lowercase()))
        .or_else(|| suggestions.first())
        .cloned()
}
