//! Room session: turns client actions into room mutations and events.
//!
//! Every action names its room by invite code and carries its own
//! identity (a join payload, a ballot's voter field); there is no
//! per-connection "current user". The events an action produces are
//! published on the room's topic, in order, and also returned to the
//! caller.
//!
//! Actions on one room take turns: the mutation and the publish of its
//! events happen under that room's turn lock, so subscribers receive
//! `Update` snapshots in the order the registry produced them.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;
use platepick_protocol::{
    ClientAction, InviteCode, RoomEvent, RoomId, SelectionStrategy, UserId, VoteMessage,
    decode_user_id, is_vote_message, room_topic,
};
use platepick_room::{Room, RoomError, RoomRegistry, UserDirectory};
use platepick_select::SelectionEngine;
use platepick_suggest::SuggestionProvider;
use platepick_vote::VoteLedger;

use crate::PlatepickError;
use crate::bus::MessageBus;

pub const UNANIMOUS_EXPLANATION: &str = "Selected by unanimous approval";
pub const INVALID_VOTE_MESSAGE: &str = "Invalid vote message format";
pub const NO_SELECTION_MESSAGE: &str =
    "Could not select a restaurant. Make sure there are suggestions available.";

/// Where a room's approval round stands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum VoteRound {
    #[default]
    Idle,
    /// Ballots are being collected for this candidate.
    Voting(String),
}

/// The room session engine.
///
/// Owns the vote ledger and round state; shares the registry with the
/// selection engine. Cheap to share behind an `Arc`.
pub struct RoomSession<P, B> {
    registry: Arc<RoomRegistry>,
    ledger: VoteLedger,
    engine: SelectionEngine<P>,
    provider: Arc<P>,
    directory: Arc<dyn UserDirectory>,
    bus: Arc<B>,
    rounds: DashMap<InviteCode, VoteRound>,
    turns: DashMap<InviteCode, Arc<Mutex<()>>>,
}

impl<P: SuggestionProvider, B: MessageBus> RoomSession<P, B> {
    pub fn new(
        registry: Arc<RoomRegistry>,
        provider: Arc<P>,
        directory: Arc<dyn UserDirectory>,
        bus: Arc<B>,
    ) -> Self {
        Self {
            engine: SelectionEngine::new(Arc::clone(&registry), Arc::clone(&provider)),
            registry,
            ledger: VoteLedger::new(),
            provider,
            directory,
            bus,
            rounds: DashMap::new(),
            turns: DashMap::new(),
        }
    }

    pub fn registry(&self) -> &RoomRegistry {
        &self.registry
    }

    pub fn ledger(&self) -> &VoteLedger {
        &self.ledger
    }

    pub fn round(&self, invite_code: &str) -> VoteRound {
        self.rounds
            .get(invite_code)
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    /// Creates a room founded by a user known to the directory.
    pub fn create_room(&self, creator: UserId) -> Result<Room, PlatepickError> {
        let member = self
            .directory
            .find(creator)
            .ok_or(PlatepickError::UnknownUser(creator))?;
        Ok(self.registry.create_room(member))
    }

    /// Bumps the legacy counter of a suggestion.
    pub fn cast_vote(&self, room_id: RoomId, candidate: &str) -> Result<u32, PlatepickError> {
        Ok(self.registry.vote_counter(room_id, candidate)?)
    }

    /// The legacy counter leader, if anyone has voted.
    pub fn best(&self, room_id: RoomId) -> Option<String> {
        self.registry.best_by_counter(room_id)
    }

    /// Applies `action` to the room behind `invite_code`, publishes the
    /// resulting events on the room topic and returns them.
    ///
    /// Waits for any earlier action on the same room to finish publishing.
    pub async fn handle(&self, invite_code: &str, action: ClientAction) -> Vec<RoomEvent> {
        tracing::debug!(%invite_code, action = action.name(), "room action");
        let turn = self.turn(invite_code);
        let _turn = match &turn {
            Some(turn) => Some(turn.lock().await),
            None => None,
        };
        let events = self.apply(invite_code, action).await;

        let topic = room_topic(invite_code);
        for event in &events {
            if let Err(e) = self.bus.publish(&topic, event.clone()).await {
                tracing::warn!(%topic, kind = event.kind(), error = %e, "publish failed");
            }
        }
        events
    }

    /// The turn lock of a live room. Unknown codes get none, so they
    /// never grow the map.
    fn turn(&self, invite_code: &str) -> Option<Arc<Mutex<()>>> {
        self.registry.find_by_invite_code(invite_code)?;
        let turn = self.turns.entry(InviteCode::from(invite_code)).or_default();
        Some(turn.value().clone())
    }

    async fn apply(&self, invite_code: &str, action: ClientAction) -> Vec<RoomEvent> {
        // Ballots are checked before the room, like any malformed frame.
        let ballot = match &action {
            ClientAction::Suggest { name } if is_vote_message(name) => {
                match VoteMessage::parse(name) {
                    Ok(ballot) => Some(ballot),
                    Err(e) => {
                        tracing::warn!(%invite_code, error = %e, "malformed vote");
                        return vec![RoomEvent::error(INVALID_VOTE_MESSAGE)];
                    }
                }
            }
            _ => None,
        };

        let Some(room) = self.registry.find_by_invite_code(invite_code) else {
            tracing::warn!(%invite_code, action = action.name(), "room not found");
            let err = RoomError::NotFound(InviteCode::from(invite_code));
            return vec![RoomEvent::error(err.to_string())];
        };

        if let Some(ballot) = ballot {
            return self.vote(&room, ballot);
        }

        match action {
            ClientAction::Join { user } => vec![self.join(&room, decode_user_id(&user))],
            ClientAction::Leave { user } => {
                let user = decode_user_id(&user);
                tracing::info!(room_id = %room.id, %user, "member left");
                vec![update(&room)]
            }
            ClientAction::Suggest { name } => vec![self.suggest(&room, &name)],
            ClientAction::AiSuggest { prompt } => {
                if let Err(e) = self
                    .registry
                    .add_ai_suggestions(room.id, &prompt, self.provider.as_ref())
                    .await
                {
                    tracing::warn!(room_id = %room.id, error = %e, "AI suggestions failed");
                }
                vec![self.refreshed(&room)]
            }
            ClientAction::StartVote { candidate } => vec![self.start_vote(&room, candidate)],
            ClientAction::SelectRestaurant { strategy } => {
                vec![self.select(&room, strategy).await]
            }
        }
    }

    fn join(&self, room: &Room, user: UserId) -> RoomEvent {
        let Some(member) = self.directory.find(user) else {
            tracing::debug!(room_id = %room.id, %user, "join by unknown user ignored");
            return update(room);
        };
        match self.registry.join_room(room.invite_code.as_str(), member) {
            Ok(updated) => update(&updated),
            Err(e) => RoomEvent::error(e.to_string()),
        }
    }

    fn suggest(&self, room: &Room, name: &str) -> RoomEvent {
        let name = name.trim();
        if name.is_empty() {
            tracing::debug!(room_id = %room.id, "blank suggestion ignored");
            return update(room);
        }
        match self.registry.add_suggestion(room.id, name) {
            Ok(()) => {}
            Err(RoomError::DuplicateSuggestion { .. }) => {
                tracing::debug!(room_id = %room.id, suggestion = %name, "duplicate suggestion ignored");
            }
            Err(e) => return RoomEvent::error(e.to_string()),
        }
        self.refreshed(room)
    }

    fn start_vote(&self, room: &Room, candidate: String) -> RoomEvent {
        let code = room.invite_code.as_str();
        self.ledger.clear_candidate(code, &candidate);
        self.rounds
            .insert(room.invite_code.clone(), VoteRound::Voting(candidate.clone()));
        tracing::info!(room_id = %room.id, %candidate, "vote started");
        RoomEvent::VoteUpdate {
            room_code: room.invite_code.clone(),
            candidate,
            votes: Default::default(),
        }
    }

    fn vote(&self, room: &Room, ballot: VoteMessage) -> Vec<RoomEvent> {
        let code = room.invite_code.as_str();
        self.rounds
            .entry(room.invite_code.clone())
            .and_modify(|round| {
                if *round == VoteRound::Idle {
                    *round = VoteRound::Voting(ballot.candidate.clone());
                }
            })
            .or_insert_with(|| VoteRound::Voting(ballot.candidate.clone()));

        let votes =
            self.ledger
                .record_vote(code, &ballot.candidate, &ballot.voter, ballot.approved);
        let mut events = vec![RoomEvent::VoteUpdate {
            room_code: room.invite_code.clone(),
            candidate: ballot.candidate.clone(),
            votes,
        }];

        let expected = room.participant_count();
        if !self.ledger.all_voted(code, &ballot.candidate, expected) {
            return events;
        }
        // Whoever removes the ballots resolves the round.
        let Some(final_votes) = self.ledger.clear_candidate(code, &ballot.candidate) else {
            return events;
        };
        // A ballot for another candidate leaves an open round alone.
        if let Some(mut round) = self.rounds.get_mut(code) {
            if matches!(&*round, VoteRound::Voting(open) if *open == ballot.candidate) {
                *round = VoteRound::Idle;
            }
        }

        let unanimous = !final_votes.is_empty() && final_votes.values().all(|ok| *ok);
        if unanimous {
            tracing::info!(room_id = %room.id, candidate = %ballot.candidate, "unanimous approval");
            events.push(RoomEvent::Selection {
                candidate: ballot.candidate,
                explanation: UNANIMOUS_EXPLANATION.to_string(),
                room_code: room.invite_code.clone(),
            });
        } else {
            tracing::info!(room_id = %room.id, candidate = %ballot.candidate, "candidate rejected");
            events.push(RoomEvent::error(format!(
                "Restaurant '{}' was not unanimously approved",
                ballot.candidate
            )));
        }
        events
    }

    async fn select(&self, room: &Room, strategy: SelectionStrategy) -> RoomEvent {
        match self.engine.select(room.id, strategy).await {
            Some(selection) => RoomEvent::Selection {
                candidate: selection.candidate,
                explanation: selection.explanation,
                room_code: room.invite_code.clone(),
            },
            None => {
                tracing::warn!(room_id = %room.id, %strategy, "nothing to select");
                RoomEvent::error(NO_SELECTION_MESSAGE)
            }
        }
    }

    // Rooms are never deleted, so the stale snapshot is only a fallback.
    fn refreshed(&self, room: &Room) -> RoomEvent {
        match self.registry.find_by_id(room.id) {
            Some(current) => update(&current),
            None => update(room),
        }
    }
}

fn update(room: &Room) -> RoomEvent {
    RoomEvent::Update {
        participant_count: room.participant_count(),
        ready: false,
        participants: room.participant_names(),
        suggestions: room.suggestions.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_reflects_room() {
        let registry = RoomRegistry::new();
        let room = registry.create_room(platepick_room::Member::new(UserId(1), "alice"));
        registry.add_suggestion(room.id, "Tacos").unwrap();
        let room = registry.find_by_id(room.id).unwrap();

        assert_eq!(
            update(&room),
            RoomEvent::Update {
                participant_count: 1,
                ready: false,
                participants: vec!["alice".to_string()],
                suggestions: vec!["Tacos".to_string()],
            }
        );
    }

    #[test]
    fn test_round_defaults_to_idle() {
        assert_eq!(VoteRound::default(), VoteRound::Idle);
    }
}
