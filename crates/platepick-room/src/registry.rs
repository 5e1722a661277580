//! Room registry: creates, finds, and mutates rooms.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use platepick_protocol::{InviteCode, RoomId};
use platepick_suggest::SuggestionProvider;

use crate::{InviteCodeGenerator, Member, Room, RoomError};

/// A live room plus its legacy per-suggestion counters.
///
/// The counters are bumped by direct "vote for this suggestion" calls and
/// are unrelated to the approve/reject ballots of a voting round.
#[derive(Debug)]
struct RoomSlot {
    room: Room,
    counters: HashMap<String, u32>,
}

/// Owns every room in the process.
///
/// Rooms sit in a sharded map keyed by id, so a mutation holds the lock
/// of one room's shard only for the duration of the in-memory change.
/// Nothing is ever awaited while a room entry is held.
#[derive(Debug)]
pub struct RoomRegistry {
    rooms: DashMap<RoomId, RoomSlot>,
    /// Invite code index. A code is reserved here before its room exists.
    invites: DashMap<InviteCode, RoomId>,
    next_id: AtomicU64,
    codes: InviteCodeGenerator,
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self {
            rooms: DashMap::new(),
            invites: DashMap::new(),
            next_id: AtomicU64::new(1),
            codes: InviteCodeGenerator::new(),
        }
    }

    /// Creates a room whose only member is `creator`.
    pub fn create_room(&self, creator: Member) -> Room {
        let room_id = RoomId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let invite_code = self.reserve_code(room_id);

        let room = Room::new(room_id, invite_code.clone(), creator);
        self.rooms.insert(
            room_id,
            RoomSlot {
                room: room.clone(),
                counters: HashMap::new(),
            },
        );
        tracing::info!(%room_id, %invite_code, creator = %room.creator, "room created");
        room
    }

    // Two creators can draw the same free code between the existence
    // check and the insert; the vacant-entry insert is the real claim.
    fn reserve_code(&self, room_id: RoomId) -> InviteCode {
        loop {
            let candidate = self.codes.ensure_unique(|c| self.invites.contains_key(c));
            match self.invites.entry(candidate) {
                Entry::Vacant(slot) => {
                    let code = slot.key().clone();
                    slot.insert(room_id);
                    return code;
                }
                Entry::Occupied(taken) => {
                    tracing::warn!(invite_code = %taken.key(), "invite code claimed concurrently, regenerating");
                }
            }
        }
    }

    /// Adds `member` to the room behind `invite_code` unless already
    /// present, and returns the room as it is afterwards.
    pub fn join_room(&self, invite_code: &str, member: Member) -> Result<Room, RoomError> {
        let room_id = self.resolve(invite_code)?;
        let mut slot = self
            .rooms
            .get_mut(&room_id)
            .ok_or_else(|| RoomError::NotFound(InviteCode::from(invite_code)))?;

        let member_id = member.id;
        if slot.room.add_member(member) {
            tracing::info!(%room_id, member = %member_id, "member joined");
        } else {
            tracing::debug!(%room_id, member = %member_id, "member already in room");
        }
        Ok(slot.room.clone())
    }

    /// Appends a suggestion and starts its counter at zero.
    pub fn add_suggestion(&self, room_id: RoomId, name: &str) -> Result<(), RoomError> {
        let mut slot = self
            .rooms
            .get_mut(&room_id)
            .ok_or(RoomError::RoomNotFound(room_id))?;

        if slot.room.has_suggestion(name) {
            return Err(RoomError::DuplicateSuggestion {
                room_id,
                name: name.to_string(),
            });
        }
        slot.room.suggestions.push(name.to_string());
        slot.counters.insert(name.to_string(), 0);
        tracing::debug!(%room_id, suggestion = %name, "suggestion added");
        Ok(())
    }

    /// Bumps a suggestion's counter and returns the new value.
    pub fn vote_counter(&self, room_id: RoomId, name: &str) -> Result<u32, RoomError> {
        let mut slot = self
            .rooms
            .get_mut(&room_id)
            .ok_or(RoomError::RoomNotFound(room_id))?;

        let count = slot
            .counters
            .get_mut(name)
            .ok_or_else(|| RoomError::UnknownSuggestion {
                room_id,
                name: name.to_string(),
            })?;
        *count += 1;
        Ok(*count)
    }

    /// The suggestion with the highest counter.
    ///
    /// Ties go to the earliest suggestion. `None` when the room is missing
    /// or nobody has voted yet.
    pub fn best_by_counter(&self, room_id: RoomId) -> Option<String> {
        let slot = self.rooms.get(&room_id)?;
        let mut best: Option<(&String, u32)> = None;
        for name in &slot.room.suggestions {
            let count = slot.counters.get(name).copied().unwrap_or(0);
            if count > best.map_or(0, |(_, c)| c) {
                best = Some((name, count));
            }
        }
        best.map(|(name, _)| name.clone())
    }

    /// Counters in suggestion order.
    pub fn tally(&self, room_id: RoomId) -> Option<Vec<(String, u32)>> {
        let slot = self.rooms.get(&room_id)?;
        Some(
            slot.room
                .suggestions
                .iter()
                .map(|name| (name.clone(), slot.counters.get(name).copied().unwrap_or(0)))
                .collect(),
        )
    }

    pub fn find_by_id(&self, room_id: RoomId) -> Option<Room> {
        self.rooms.get(&room_id).map(|slot| slot.room.clone())
    }

    pub fn find_by_invite_code(&self, invite_code: &str) -> Option<Room> {
        let room_id = self.resolve(invite_code).ok()?;
        self.find_by_id(room_id)
    }

    /// Asks `provider` for suggestions and adds the new ones.
    ///
    /// The prompt is extended with the room's current suggestions so the
    /// provider can avoid repeats. Returns how many names were actually
    /// inserted; a failing provider inserts nothing.
    pub async fn add_ai_suggestions<P: SuggestionProvider>(
        &self,
        room_id: RoomId,
        prompt: &str,
        provider: &P,
    ) -> Result<usize, RoomError> {
        let current = self
            .find_by_id(room_id)
            .ok_or(RoomError::RoomNotFound(room_id))?
            .suggestions;

        let enriched = if current.is_empty() {
            prompt.to_string()
        } else {
            format!("{prompt}. Current suggestions include: {}", current.join(", "))
        };

        let names = match provider.suggest(&enriched).await {
            Ok(names) => names,
            Err(e) => {
                tracing::warn!(%room_id, error = %e, "AI suggestions unavailable");
                return Ok(0);
            }
        };

        let mut added = 0;
        for name in names {
            match self.add_suggestion(room_id, &name) {
                Ok(()) => added += 1,
                Err(RoomError::DuplicateSuggestion { .. }) => {
                    tracing::debug!(%room_id, suggestion = %name, "skipping duplicate AI suggestion");
                }
                Err(e) => return Err(e),
            }
        }
        tracing::info!(%room_id, added, "AI suggestions added");
        Ok(added)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    fn resolve(&self, invite_code: &str) -> Result<RoomId, RoomError> {
        self.invites
            .get(invite_code)
            .map(|id| *id)
            .ok_or_else(|| RoomError::NotFound(InviteCode::from(invite_code)))
    }
}
