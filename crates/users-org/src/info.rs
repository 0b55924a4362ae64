//! Permission-pruned organization tree projection
//!
//! [`OrganizationInfo`] is a request-scoped, read-only copy of an
//! organization subtree prepared for one specific viewer. Membership and
//! admin flags are computed at the root and inherited downwards, then a
//! post-order pass prunes every branch in which the viewer has no
//! membership anywhere.

use std::collections::HashSet;

use serde::Serialize;

use crate::error::GraphError;
use crate::graph::OrganizationGraph;
use crate::ids::{OrganizationId, UserId};
use crate::organization::I18nText;

/// A pruned, viewer-specific projection of an organization subtree.
///
/// Built fresh per request from the current graph snapshot and never
/// mutated afterwards. Construction cost is proportional to the size of
/// the descendant subtree, so it should not be cached across requests.
///
/// # Examples
///
/// ```
/// use users_org::{Organization, OrganizationGraph, OrganizationId, OrganizationInfo,
///                 PrivacyLevel, UserEdgeLabel, UserId};
///
/// let mut graph = OrganizationGraph::new();
/// let root = OrganizationId::parse("root").unwrap();
/// let mut org = Organization::builder(root.clone()).build();
/// let alice = UserId::parse("alice").unwrap();
/// org.link_user(alice.clone(), UserEdgeLabel::IsMember, PrivacyLevel::World);
/// graph.insert(org);
///
/// let info = OrganizationInfo::build(&graph, &root, &alice).unwrap();
/// assert!(info.you_are_member);
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationInfo {
    /// The projected organization's id
    pub organization_id: OrganizationId,

    /// Display name
    pub name: I18nText,

    /// Description
    pub description: I18nText,

    /// Whether the viewer is a member of this organization (directly, or
    /// inherited from an ancestor during construction)
    pub you_are_member: bool,

    /// Whether the viewer may add members here
    pub you_can_add_members: bool,

    /// Whether the viewer may create child organizations here
    pub you_can_create_child_organizations: bool,

    /// Administrators of this organization
    pub admins: Vec<UserId>,

    /// Members of this organization
    pub members: Vec<UserId>,

    /// Child organizations, pruned to branches where the viewer has a
    /// membership somewhere
    pub childs: Vec<OrganizationInfo>,
}

impl OrganizationInfo {
    /// Build the pruned projection of the subtree rooted at `org_id`, as
    /// seen by `viewer`.
    ///
    /// Fails with [`GraphError::UnknownOrganization`] when the root id
    /// does not resolve. The graph is never mutated.
    pub fn build(
        graph: &OrganizationGraph,
        org_id: &OrganizationId,
        viewer: &UserId,
    ) -> Result<Self, GraphError> {
        let mut visited = HashSet::new();
        let mut root = Self::wrap(graph, org_id, viewer, Seed::default(), &mut visited)
            .ok_or_else(|| GraphError::UnknownOrganization(org_id.clone()))?;
        root.prune();
        Ok(root)
    }

    /// Wrap one node and recurse into its children.
    ///
    /// `visited` guards against `IsChildOf` cycles: a node already wrapped
    /// anywhere in this projection is not wrapped again. Children whose id
    /// does not resolve in the graph are skipped.
    fn wrap(
        graph: &OrganizationGraph,
        org_id: &OrganizationId,
        viewer: &UserId,
        seed: Seed,
        visited: &mut HashSet<OrganizationId>,
    ) -> Option<Self> {
        let org = graph.get(org_id)?;
        visited.insert(org_id.clone());

        let admins = org.admins();
        let members = org.members();
        let is_admin = admins.contains(viewer);

        // Flags inherit down the tree: true at an ancestor seeds the children.
        let you_are_member = seed.member || is_admin || members.contains(viewer);
        let you_can_add_members = seed.add_members || is_admin;
        let you_can_create_child_organizations = seed.create_childs || is_admin;

        let child_seed = Seed {
            member: you_are_member,
            add_members: you_can_add_members,
            create_childs: you_can_create_child_organizations,
        };

        let mut childs = Vec::new();
        for child_id in org.sub_organizations() {
            if visited.contains(&child_id) {
                continue;
            }
            if let Some(child) = Self::wrap(graph, &child_id, viewer, child_seed, visited) {
                childs.push(child);
            }
        }

        Some(Self {
            organization_id: org_id.clone(),
            name: org.name.clone(),
            description: org.description.clone(),
            you_are_member,
            you_can_add_members,
            you_can_create_child_organizations,
            admins,
            members,
            childs,
        })
    }

    /// Post-order membership check and pruning.
    ///
    /// Returns whether the viewer is a member of this node or of any of
    /// its (already pruned) descendants; children for which this does not
    /// hold are dropped. A leaf short-circuits to its own flag.
    fn prune(&mut self) -> bool {
        if self.childs.is_empty() {
            return self.you_are_member;
        }
        self.childs.retain_mut(|child| child.prune());
        self.you_are_member || !self.childs.is_empty()
    }
}

/// Flags propagated from parent to child during wrapping.
#[derive(Debug, Clone, Copy, Default)]
struct Seed {
    member: bool,
    add_members: bool,
    create_childs: bool,
}
