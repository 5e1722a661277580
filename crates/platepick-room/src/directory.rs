//! User lookup.

use dashmap::DashMap;
use platepick_protocol::UserId;

use crate::Member;

/// Resolves a user id to the member a room should display.
///
/// Registration and authentication live elsewhere; rooms only need a
/// name for an id.
pub trait UserDirectory: Send + Sync + 'static {
    /// `None` for unknown ids and for [`UserId::NONE`].
    fn find(&self, id: UserId) -> Option<Member>;
}

/// A directory backed by a concurrent map.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    users: DashMap<UserId, String>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or renames) a user.
    pub fn insert(&self, id: UserId, name: impl Into<String>) {
        self.users.insert(id, name.into());
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl UserDirectory for InMemoryDirectory {
    fn find(&self, id: UserId) -> Option<Member> {
        if !id.is_some() {
            return None;
        }
        self.users
            .get(&id)
            .map(|name| Member::new(id, name.value().clone()))
    }
}
