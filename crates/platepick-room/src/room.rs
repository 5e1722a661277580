//! Room and member snapshots.

use platepick_protocol::{InviteCode, RoomId, UserId};
use serde::{Deserialize, Serialize};

/// A user as seen by a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: UserId,
    pub name: String,
}

impl Member {
    pub fn new(id: UserId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// A room's membership and suggestion list.
///
/// Callers only ever hold clones; the live copy stays inside the
/// [`RoomRegistry`](crate::RoomRegistry). Members are unique by id and
/// suggestions are unique by exact text, both kept in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub invite_code: InviteCode,
    pub creator: UserId,
    pub members: Vec<Member>,
    pub suggestions: Vec<String>,
}

impl Room {
    pub(crate) fn new(id: RoomId, invite_code: InviteCode, creator: Member) -> Self {
        Self {
            id,
            invite_code,
            creator: creator.id,
            members: vec![creator],
            suggestions: Vec::new(),
        }
    }

    pub fn participant_count(&self) -> usize {
        self.members.len()
    }

    /// Member display names, in join order.
    pub fn participant_names(&self) -> Vec<String> {
        self.members.iter().map(|m| m.name.clone()).collect()
    }

    pub fn has_member(&self, id: UserId) -> bool {
        self.members.iter().any(|m| m.id == id)
    }

    pub fn has_suggestion(&self, name: &str) -> bool {
        self.suggestions.iter().any(|s| s == name)
    }

    /// Adds `member` unless someone with the same id is already here.
    pub(crate) fn add_member(&mut self, member: Member) -> bool {
        if self.has_member(member.id) {
            return false;
        }
        self.members.push(member);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room() -> Room {
        Room::new(RoomId(1), InviteCode::from("ABC123"), Member::new(UserId(1), "alice"))
    }

    #[test]
    fn test_creator_is_first_member() {
        let room = room();
        assert_eq!(room.creator, UserId(1));
        assert_eq!(room.participant_names(), vec!["alice".to_string()]);
    }

    #[test]
    fn test_add_member_dedupes_by_id() {
        let mut room = room();
        assert!(room.add_member(Member::new(UserId(2), "bob")));
        assert!(!room.add_member(Member::new(UserId(2), "robert")));
        assert_eq!(room.participant_count(), 2);
        assert_eq!(room.members[1].name, "bob");
    }

    #[test]
    fn test_serialized_layout() {
        let json = serde_json::to_value(room()).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["invite_code"], "ABC123");
        assert_eq!(json["members"][0]["name"], "alice");
        assert!(json["suggestions"].as_array().unwrap().is_empty());
    }
}
