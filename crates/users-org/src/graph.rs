//! Organization graph store and traversal
//!
//! The graph is an arena keyed by [`OrganizationId`]; edges on the stored
//! aggregates carry endpoint ids, so walking the graph always goes through
//! this store. Traversal tolerates cycles: a node already collected is
//! never expanded again.

use std::collections::HashMap;
use std::collections::HashSet;

use crate::edge::OrgEdgeLabel;
use crate::ids::OrganizationId;
use crate::organization::Organization;

/// Arena of organizations keyed by identifier.
///
/// # Examples
///
/// ```
/// use users_org::{Organization, OrganizationGraph, OrganizationId};
///
/// let mut graph = OrganizationGraph::new();
/// let id = OrganizationId::parse("acme").unwrap();
/// graph.insert(Organization::builder(id.clone()).build());
/// assert!(graph.contains(&id));
/// ```
#[derive(Debug, Clone, Default)]
pub struct OrganizationGraph {
    nodes: HashMap<OrganizationId, Organization>,
}

impl OrganizationGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an organization, replacing any previous one with the same id.
    pub fn insert(&mut self, organization: Organization) -> Option<Organization> {
        self.nodes.insert(organization.id().clone(), organization)
    }

    /// Look up an organization.
    pub fn get(&self, id: &OrganizationId) -> Option<&Organization> {
        self.nodes.get(id)
    }

    /// Look up an organization for mutation.
    pub fn get_mut(&mut self, id: &OrganizationId) -> Option<&mut Organization> {
        self.nodes.get_mut(id)
    }

    /// Remove an organization from the graph.
    ///
    /// Edges on other organizations pointing at the removed id are left in
    /// place; traversal skips endpoints that no longer resolve.
    pub fn remove(&mut self, id: &OrganizationId) -> Option<Organization> {
        self.nodes.remove(id)
    }

    /// Whether an organization with this id is stored.
    pub fn contains(&self, id: &OrganizationId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Number of stored organizations.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over all stored organizations.
    pub fn iter(&self) -> impl Iterator<Item = &Organization> {
        self.nodes.values()
    }

    /// All transitive parents of an organization.
    ///
    /// Follows outgoing `IsChildOf` edges target-by-target. A node already
    /// present in the accumulator is not expanded again, which is what
    /// terminates traversal on cyclic hierarchies. Endpoint ids that do
    /// not resolve in the graph are skipped.
    ///
    /// The optional filter applies to the returned set only; it never
    /// affects which branches are walked.
    pub fn all_parents(
        &self,
        start: &OrganizationId,
        filter: Option<&dyn Fn(&Organization) -> bool>,
    ) -> HashSet<OrganizationId> {
        let mut collected = HashSet::new();
        if let Some(org) = self.get(start) {
            for parent_id in org.parents() {
                self.collect_parents(&parent_id, &mut collected);
            }
        }
        self.apply_filter(collected, filter)
    }

    /// Like [`all_parents`](Self::all_parents), but the result also
    /// contains the starting organization itself.
    pub fn me_and_all_parents(
        &self,
        start: &OrganizationId,
        filter: Option<&dyn Fn(&Organization) -> bool>,
    ) -> HashSet<OrganizationId> {
        let mut collected = HashSet::new();
        self.collect_parents(start, &mut collected);
        self.apply_filter(collected, filter)
    }

    fn collect_parents(&self, id: &OrganizationId, collected: &mut HashSet<OrganizationId>) {
        // Insertion returning false means we have been here; stop the branch.
        if !collected.insert(id.clone()) {
            return;
        }
        if let Some(org) = self.get(id) {
            for parent_id in org.parents() {
                self.collect_parents(&parent_id, collected);
            }
        }
    }

    fn apply_filter(
        &self,
        collected: HashSet<OrganizationId>,
        filter: Option<&dyn Fn(&Organization) -> bool>,
    ) -> HashSet<OrganizationId> {
        match filter {
            None => collected,
            Some(keep) => collected
                .into_iter()
                .filter(|id| self.get(id).map(keep).unwrap_or(false))
                .collect(),
        }
    }

    /// Link `child` below `parent` with a pair of `IsChildOf` edges.
    ///
    /// Convenience for wiring hierarchies: adds the outgoing edge on the
    /// child and the incoming edge on the parent in one step. Does nothing
    /// if either id is unknown.
    pub fn link_child(&mut self, parent: &OrganizationId, child: &OrganizationId) {
        if !self.contains(parent) || !self.contains(child) {
            return;
        }
        if let Some(child_org) = self.get_mut(child) {
            child_org.add_out_edge(OrgEdgeLabel::IsChildOf, parent.clone(), Default::default());
        }
        if let Some(parent_org) = self.get_mut(parent) {
            parent_org.add_in_edge(child.clone(), OrgEdgeLabel::IsChildOf, Default::default());
        }
    }
}
