//! # Users Platform Organization Model
//!
//! This crate provides the domain model for the Social Open Data users
//! service: accounts, organizations, groups, and the typed edges that
//! connect them.
//!
//! ## Overview
//!
//! The users-org crate handles:
//! - **Identifiers**: Case-insensitive, string-backed entity ids
//! - **Edges**: Typed, labeled, directed relationships with privacy levels
//! - **Organizations**: Aggregates owning their in/out edge collections
//! - **Graph**: Arena-style store with cycle-tolerant traversal
//! - **OrganizationInfo**: Permission-pruned per-viewer tree projection
//! - **Notifications**: Per-entity append-only notification store
//! - **JSON codec**: Expandable serialization and validated parsing
//!
//! ## Architecture
//!
//! ```text
//! OrganizationGraph (arena keyed by OrganizationId)
//!   └─ Organization
//!        ├─ UserEdge (IsAdmin | IsMember | IsGuest | IsFollower) ─→ UserId
//!        ├─ OrgEdge in/out (IsChildOf | IsParent | IsSubsidiary) ─→ OrganizationId
//!        └─ derived views: admins / members / guests / parents / sub_organizations
//!
//! OrganizationInfo::build(graph, org, viewer)
//!   └─ recursive child wrapping + post-order membership pruning
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use users_org::{Organization, OrganizationGraph, OrganizationId, UserEdgeLabel, UserId};
//!
//! let mut graph = OrganizationGraph::new();
//! let org_id = OrganizationId::parse("acme").unwrap();
//! let mut org = Organization::builder(org_id.clone()).name("en", "Acme Corp").build();
//!
//! let alice = UserId::parse("alice").unwrap();
//! org.link_user(alice, UserEdgeLabel::IsMember, Default::default());
//! graph.insert(org);
//!
//! assert_eq!(graph.get(&org_id).unwrap().members().len(), 1);
//! ```

pub mod edge;
pub mod error;
pub mod graph;
pub mod group;
pub mod ids;
pub mod info;
pub mod json;
pub mod notifications;
pub mod organization;
pub mod user;

// Re-export main types for convenience
pub use edge::{OrgEdge, OrgEdgeLabel, PrivacyLevel, UserEdge, UserEdgeLabel};
pub use error::{GraphError, IdError, ParseError};
pub use graph::OrganizationGraph;
pub use group::Group;
pub use ids::{GroupId, OrganizationId, UserId};
pub use info::OrganizationInfo;
pub use json::{organization_to_json, parse_organization, ExpandMode, JsonOptions};
pub use notifications::{Notification, NotificationStore};
pub use organization::{
    Address, AttachedFile, GeoCoordinate, I18nText, Organization, OrganizationBuilder,
};
pub use user::User;
