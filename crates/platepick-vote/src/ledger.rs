//! The ballot store.

use dashmap::DashMap;
use platepick_protocol::VoteSnapshot;

/// Ballot box key: one entry per candidate under vote in a room.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct BallotKey {
    room_code: String,
    candidate: String,
}

impl BallotKey {
    fn new(room_code: &str, candidate: &str) -> Self {
        Self {
            room_code: room_code.to_string(),
            candidate: candidate.to_string(),
        }
    }
}

/// Concurrent tally of approve/reject ballots.
///
/// Each `(room code, candidate)` pair is an independent entry of a sharded
/// map, so voters in different rooms (or on different candidates) never
/// contend. A voter's latest ballot replaces any earlier one.
///
/// Entries are created on first vote and live until explicitly cleared.
#[derive(Debug, Default)]
pub struct VoteLedger {
    ballots: DashMap<BallotKey, VoteSnapshot>,
}

impl VoteLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `voter`'s ballot and returns the tally as it stands right
    /// after the write.
    pub fn record_vote(
        &self,
        room_code: &str,
        candidate: &str,
        voter: &str,
        approved: bool,
    ) -> VoteSnapshot {
        let mut entry = self
            .ballots
            .entry(BallotKey::new(room_code, candidate))
            .or_default();
        let previous = entry.insert(voter.to_string(), approved);
        if previous.is_some() {
            tracing::debug!(%room_code, %candidate, %voter, approved, "ballot replaced");
        }
        entry.clone()
    }

    /// Current ballots for a candidate; empty if nobody has voted.
    pub fn votes(&self, room_code: &str, candidate: &str) -> VoteSnapshot {
        self.ballots
            .get(&BallotKey::new(room_code, candidate))
            .map(|entry| entry.clone())
            .unwrap_or_default()
    }

    /// Whether at least `expected` distinct voters have cast a ballot.
    ///
    /// More ballots than `expected` also counts as complete; voters who
    /// were never members are not filtered out.
    pub fn all_voted(&self, room_code: &str, candidate: &str, expected: usize) -> bool {
        self.ballots
            .get(&BallotKey::new(room_code, candidate))
            .is_some_and(|entry| entry.len() >= expected)
    }

    /// Whether every recorded ballot approves. `false` with no ballots.
    pub fn all_approved(&self, room_code: &str, candidate: &str) -> bool {
        self.ballots
            .get(&BallotKey::new(room_code, candidate))
            .is_some_and(|entry| !entry.is_empty() && entry.values().all(|approved| *approved))
    }

    /// Drops every candidate's ballots for a room.
    pub fn clear_room(&self, room_code: &str) {
        self.ballots.retain(|key, _| key.room_code != room_code);
    }

    /// Drops the ballots for one candidate and hands back what was there.
    ///
    /// Only one of several concurrent callers gets `Some`, which makes
    /// this the point where a round is resolved exactly once.
    pub fn clear_candidate(&self, room_code: &str, candidate: &str) -> Option<VoteSnapshot> {
        self.ballots
            .remove(&BallotKey::new(room_code, candidate))
            .map(|(_, ballots)| ballots)
    }

    /// Number of live ballot boxes across all rooms.
    pub fn len(&self) -> usize {
        self.ballots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ballots.is_empty()
    }
}
