//! Typed graph edges
//!
//! This module defines the directed, labeled relationships between users
//! and organizations and between organizations themselves. Edges store the
//! identifiers of their endpoints rather than references, so aggregates
//! stay serializable and the graph stays free of reference cycles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ids::{OrganizationId, UserId};

/// Visibility of an edge (or entity field) to non-owners.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PrivacyLevel {
    /// Visible only to the owning entity
    Private,

    /// Visible to friends of the owning entity
    Friends,

    /// Visible to any signed-in user
    Public,

    /// Visible to everyone, signed-in or not
    #[default]
    World,
}

impl PrivacyLevel {
    /// Parse a privacy level from its wire representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "private" => Some(Self::Private),
            "friends" => Some(Self::Friends),
            "public" => Some(Self::Public),
            "world" => Some(Self::World),
            _ => None,
        }
    }

    /// Wire representation of the privacy level.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Private => "private",
            Self::Friends => "friends",
            Self::Public => "public",
            Self::World => "world",
        }
    }
}

/// Role of a user within an organization.
///
/// A single edge carries exactly one label for its whole lifetime; a user
/// holding two roles in the same organization is modeled as two edges.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum UserEdgeLabel {
    /// The user administrates the organization
    IsAdmin,

    /// The user is a regular member
    IsMember,

    /// The user is a guest with limited visibility
    IsGuest,

    /// The user follows the organization's news
    IsFollower,
}

/// Structural relation between two organizations.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum OrgEdgeLabel {
    /// The source organization is a child of the target
    IsChildOf,

    /// The source organization is a parent of the target
    IsParent,

    /// The source organization is a subsidiary of the target
    IsSubsidiary,
}

/// A user-to-organization relationship.
///
/// Stored on the organization's incoming edge list. The label is fixed at
/// construction; the edge id gives every edge a removable identity even
/// when two edges are logical duplicates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserEdge {
    /// Unique edge identity
    pub id: Uuid,

    /// The user at the source of the edge
    pub user_id: UserId,

    /// Role carried by this edge
    pub label: UserEdgeLabel,

    /// The organization at the target of the edge
    pub organization_id: OrganizationId,

    /// Visibility of this edge to non-owners
    pub privacy: PrivacyLevel,

    /// When the edge was created
    pub created_at: DateTime<Utc>,
}

impl UserEdge {
    /// Creates a new user-to-organization edge.
    pub fn new(
        user_id: UserId,
        label: UserEdgeLabel,
        organization_id: OrganizationId,
        privacy: PrivacyLevel,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            user_id,
            label,
            organization_id,
            privacy,
            created_at: Utc::now(),
        }
    }
}

/// An organization-to-organization relationship.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrgEdge {
    /// Unique edge identity
    pub id: Uuid,

    /// Source organization
    pub source: OrganizationId,

    /// Structural relation carried by this edge
    pub label: OrgEdgeLabel,

    /// Target organization
    pub target: OrganizationId,

    /// Visibility of this edge to non-owners
    pub privacy: PrivacyLevel,

    /// When the edge was created
    pub created_at: DateTime<Utc>,
}

impl OrgEdge {
    /// Creates a new organization-to-organization edge.
    pub fn new(
        source: OrganizationId,
        label: OrgEdgeLabel,
        target: OrganizationId,
        privacy: PrivacyLevel,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            source,
            label,
            target,
            privacy,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_privacy_level_round_trip() {
        for level in [
            PrivacyLevel::Private,
            PrivacyLevel::Friends,
            PrivacyLevel::Public,
            PrivacyLevel::World,
        ] {
            assert_eq!(PrivacyLevel::parse(level.as_str()), Some(level));
        }
        assert_eq!(PrivacyLevel::parse("WORLD"), Some(PrivacyLevel::World));
        assert_eq!(PrivacyLevel::parse("everyone"), None);
    }

    #[test]
    fn test_default_privacy_is_world() {
        assert_eq!(PrivacyLevel::default(), PrivacyLevel::World);
    }

    #[test]
    fn test_duplicate_edges_have_distinct_identity() {
        let user = UserId::parse("alice").unwrap();
        let org = OrganizationId::parse("acme").unwrap();

        let a = UserEdge::new(user.clone(), UserEdgeLabel::IsMember, org.clone(), PrivacyLevel::World);
        let b = UserEdge::new(user, UserEdgeLabel::IsMember, org, PrivacyLevel::World);

        assert_ne!(a.id, b.id);
        assert_eq!(a.label, b.label);
    }
}
