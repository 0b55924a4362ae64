//! User groups
//!
//! Groups are flat collections of users, independent of the organization
//! graph. They back the `/groups` listing of the HTTP surface.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{GroupId, UserId};
use crate::organization::I18nText;

/// A named group of users.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    /// Unique identifier (immutable after construction)
    id: GroupId,

    /// Multi-language display name
    pub name: I18nText,

    /// Multi-language description
    pub description: I18nText,

    /// Member user ids
    #[serde(default)]
    pub members: Vec<UserId>,

    /// Whether the group is visible in public listings
    pub is_public: bool,

    /// When the group was created
    pub created_at: DateTime<Utc>,
}

impl Group {
    /// Creates a new empty public group.
    pub fn new(id: GroupId, name: I18nText) -> Self {
        Self {
            id,
            name,
            description: I18nText::new(),
            members: Vec::new(),
            is_public: true,
            created_at: Utc::now(),
        }
    }

    /// The group's identifier.
    pub fn id(&self) -> &GroupId {
        &self.id
    }

    /// Add a user to the group unless already present.
    pub fn add_member(&mut self, user_id: UserId) {
        if !self.members.contains(&user_id) {
            self.members.push(user_id);
        }
    }

    /// Remove a user from the group; `false` when they were not a member.
    pub fn remove_member(&mut self, user_id: &UserId) -> bool {
        let before = self.members.len();
        self.members.retain(|m| m != user_id);
        self.members.len() != before
    }

    /// Whether the user is a member of the group.
    pub fn is_member(&self, user_id: &UserId) -> bool {
        self.members.contains(user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_membership() {
        let mut group = Group::new(
            GroupId::parse("admins").unwrap(),
            I18nText::with("en", "Administrators"),
        );
        let alice = UserId::parse("alice").unwrap();

        group.add_member(alice.clone());
        group.add_member(alice.clone()); // Duplicate
        assert_eq!(group.members.len(), 1);
        assert!(group.is_member(&alice));

        assert!(group.remove_member(&alice));
        assert!(!group.remove_member(&alice));
    }
}
