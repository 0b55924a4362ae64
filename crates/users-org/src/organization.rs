//! Organization aggregate
//!
//! This module provides the core Organization entity. An organization owns
//! its incoming user edges and its incoming and outgoing organization
//! edges; membership and hierarchy views are derived from those
//! collections on demand and never stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::edge::{OrgEdge, OrgEdgeLabel, PrivacyLevel, UserEdge, UserEdgeLabel};
use crate::ids::{OrganizationId, UserId};

/// Multi-language text: a map from language tag (`"en"`, `"de"`, ...) to text.
///
/// # Examples
///
/// ```
/// use users_org::I18nText;
///
/// let mut name = I18nText::new();
/// name.set("en", "Open Data Initiative");
/// name.set("de", "Offene-Daten-Initiative");
/// assert_eq!(name.get("en"), Some("Open Data Initiative"));
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct I18nText(BTreeMap<String, String>);

impl I18nText {
    /// Creates an empty multi-language text.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a multi-language text with a single translation.
    pub fn with(language: impl Into<String>, text: impl Into<String>) -> Self {
        let mut i18n = Self::new();
        i18n.set(language, text);
        i18n
    }

    /// Set the text for a language, replacing any previous value.
    pub fn set(&mut self, language: impl Into<String>, text: impl Into<String>) {
        self.0.insert(language.into(), text.into());
    }

    /// Get the text for a language.
    pub fn get(&self, language: &str) -> Option<&str> {
        self.0.get(language).map(String::as_str)
    }

    /// Any translation, preferring English.
    pub fn any(&self) -> Option<&str> {
        self.get("en")
            .or_else(|| self.0.values().next().map(String::as_str))
    }

    /// Whether no translation is present.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over (language, text) pairs in language order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(l, t)| (l.as_str(), t.as_str()))
    }
}

/// Postal address of an organization.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Address {
    /// Street name and house number
    pub street: Option<String>,

    /// Postal code
    pub postal_code: Option<String>,

    /// City
    pub city: Option<String>,

    /// Country
    pub country: Option<String>,
}

impl Address {
    /// Whether every field is unset.
    pub fn is_empty(&self) -> bool {
        self.street.is_none()
            && self.postal_code.is_none()
            && self.city.is_none()
            && self.country.is_none()
    }
}

/// Geographical position of an organization.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GeoCoordinate {
    /// Latitude in decimal degrees
    pub latitude: f64,

    /// Longitude in decimal degrees
    pub longitude: f64,
}

/// A file attached to an organization (logo, statute, ...).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AttachedFile {
    /// File name
    pub name: String,

    /// MIME content type
    pub content_type: String,

    /// Where the file content lives
    pub url: String,
}

/// An organization: a node in the entity graph with display fields and
/// three edge collections.
///
/// The identifier is immutable after construction; all edge mutation goes
/// through the `add_*`/`link_*`/`remove_*` methods so the collections can
/// never contain a dangling endpoint id the aggregate did not produce.
///
/// # Examples
///
/// ```
/// use users_org::{Organization, OrganizationId, UserEdgeLabel, UserId, PrivacyLevel};
///
/// let id = OrganizationId::parse("acme").unwrap();
/// let mut org = Organization::builder(id)
///     .name("en", "Acme Corp")
///     .website("https://acme.example")
///     .build();
///
/// let alice = UserId::parse("alice").unwrap();
/// org.link_user(alice.clone(), UserEdgeLabel::IsAdmin, PrivacyLevel::World);
/// assert_eq!(org.admins(), vec![alice]);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organization {
    /// Unique identifier (immutable after construction)
    id: OrganizationId,

    /// Multi-language display name
    pub name: I18nText,

    /// Multi-language description
    pub description: I18nText,

    /// Primary website URL
    pub website: Option<String>,

    /// Contact e-mail address
    pub email: Option<String>,

    /// Contact telephone number
    pub telephone: Option<String>,

    /// Postal address
    pub address: Option<Address>,

    /// Geographical position
    pub geo_location: Option<GeoCoordinate>,

    /// Free-form tags
    #[serde(default)]
    pub tags: Vec<String>,

    /// Default visibility of this organization
    pub privacy: PrivacyLevel,

    /// Whether the organization is disabled (hidden from listings)
    pub is_disabled: bool,

    /// Where this record was imported from, if anywhere
    pub data_source: Option<String>,

    /// Integrity hash of the imported record, if any
    pub crypto_hash: Option<String>,

    /// Attached files
    #[serde(default)]
    pub attached_files: Vec<AttachedFile>,

    /// When the organization was created
    pub created_at: DateTime<Utc>,

    /// When the organization was last changed
    pub last_change: DateTime<Utc>,

    /// Incoming user edges (users related to this organization)
    #[serde(default)]
    user_edges_in: Vec<UserEdge>,

    /// Incoming organization edges (other orgs pointing at this one)
    #[serde(default)]
    org_edges_in: Vec<OrgEdge>,

    /// Outgoing organization edges (this org pointing at others)
    #[serde(default)]
    org_edges_out: Vec<OrgEdge>,
}

impl Organization {
    /// Start building a new organization with the given identifier.
    pub fn builder(id: OrganizationId) -> OrganizationBuilder {
        OrganizationBuilder::new(id)
    }

    /// The organization's identifier.
    pub fn id(&self) -> &OrganizationId {
        &self.id
    }

    // ------------------------------------------------------------------
    // Derived views
    // ------------------------------------------------------------------

    fn users_with_label(&self, label: UserEdgeLabel) -> Vec<UserId> {
        self.user_edges_in
            .iter()
            .filter(|e| e.label == label)
            .map(|e| e.user_id.clone())
            .collect()
    }

    /// Users related to this organization via an `IsAdmin` edge.
    pub fn admins(&self) -> Vec<UserId> {
        self.users_with_label(UserEdgeLabel::IsAdmin)
    }

    /// Users related to this organization via an `IsMember` edge.
    pub fn members(&self) -> Vec<UserId> {
        self.users_with_label(UserEdgeLabel::IsMember)
    }

    /// Users related to this organization via an `IsGuest` edge.
    pub fn guests(&self) -> Vec<UserId> {
        self.users_with_label(UserEdgeLabel::IsGuest)
    }

    /// All distinct users related to this organization, regardless of label.
    ///
    /// A user holding two roles via two edges appears once here, but in
    /// both role-specific views.
    pub fn users(&self) -> Vec<UserId> {
        let mut seen = std::collections::HashSet::new();
        self.user_edges_in
            .iter()
            .filter(|e| seen.insert(e.user_id.clone()))
            .map(|e| e.user_id.clone())
            .collect()
    }

    /// Identifiers of this organization's parents.
    ///
    /// Parents are the targets of outgoing `IsChildOf` edges.
    pub fn parents(&self) -> Vec<OrganizationId> {
        self.org_edges_out
            .iter()
            .filter(|e| e.label == OrgEdgeLabel::IsChildOf)
            .map(|e| e.target.clone())
            .collect()
    }

    /// Identifiers of this organization's sub-organizations.
    ///
    /// Children are the sources of incoming `IsChildOf` edges.
    pub fn sub_organizations(&self) -> Vec<OrganizationId> {
        self.org_edges_in
            .iter()
            .filter(|e| e.label == OrgEdgeLabel::IsChildOf)
            .map(|e| e.source.clone())
            .collect()
    }

    /// The incoming user edges.
    pub fn user_edges(&self) -> &[UserEdge] {
        &self.user_edges_in
    }

    /// The incoming organization edges.
    pub fn in_edges(&self) -> &[OrgEdge] {
        &self.org_edges_in
    }

    /// The outgoing organization edges.
    pub fn out_edges(&self) -> &[OrgEdge] {
        &self.org_edges_out
    }

    // ------------------------------------------------------------------
    // Edge mutation
    // ------------------------------------------------------------------

    /// Attach a user to this organization with the given role.
    ///
    /// No duplicate check is performed: linking the same user with the
    /// same label twice creates two distinct edges.
    pub fn link_user(
        &mut self,
        user_id: UserId,
        label: UserEdgeLabel,
        privacy: PrivacyLevel,
    ) -> UserEdge {
        let edge = UserEdge::new(user_id, label, self.id.clone(), privacy);
        self.user_edges_in.push(edge.clone());
        self.touch();
        edge
    }

    /// Add an incoming organization edge pointing at this organization.
    ///
    /// The edge's target is forced to this organization's id.
    pub fn add_in_edge(
        &mut self,
        source: OrganizationId,
        label: OrgEdgeLabel,
        privacy: PrivacyLevel,
    ) -> OrgEdge {
        let edge = OrgEdge::new(source, label, self.id.clone(), privacy);
        self.org_edges_in.push(edge.clone());
        self.touch();
        edge
    }

    /// Add an outgoing organization edge from this organization.
    ///
    /// The edge's source is forced to this organization's id.
    pub fn add_out_edge(
        &mut self,
        label: OrgEdgeLabel,
        target: OrganizationId,
        privacy: PrivacyLevel,
    ) -> OrgEdge {
        let edge = OrgEdge::new(self.id.clone(), label, target, privacy);
        self.org_edges_out.push(edge.clone());
        self.touch();
        edge
    }

    /// Remove a user edge by identity.
    ///
    /// Returns `false` when no edge with that id exists; removing an
    /// already-removed edge is a harmless no-op.
    pub fn unlink_user(&mut self, edge_id: Uuid) -> bool {
        let before = self.user_edges_in.len();
        self.user_edges_in.retain(|e| e.id != edge_id);
        let removed = self.user_edges_in.len() != before;
        if removed {
            self.touch();
        }
        removed
    }

    /// Remove all user edges matching a (label, user) pair.
    ///
    /// Silently no-ops when nothing matches.
    pub fn unlink_user_edges(&mut self, label: UserEdgeLabel, user_id: &UserId) {
        let before = self.user_edges_in.len();
        self.user_edges_in
            .retain(|e| !(e.label == label && &e.user_id == user_id));
        if self.user_edges_in.len() != before {
            self.touch();
        }
    }

    /// Remove an incoming organization edge by identity.
    pub fn remove_in_edge(&mut self, edge_id: Uuid) -> bool {
        let before = self.org_edges_in.len();
        self.org_edges_in.retain(|e| e.id != edge_id);
        let removed = self.org_edges_in.len() != before;
        if removed {
            self.touch();
        }
        removed
    }

    /// Remove all incoming organization edges matching a (label, source) pair.
    pub fn remove_in_edges(&mut self, label: OrgEdgeLabel, source: &OrganizationId) {
        let before = self.org_edges_in.len();
        self.org_edges_in
            .retain(|e| !(e.label == label && &e.source == source));
        if self.org_edges_in.len() != before {
            self.touch();
        }
    }

    /// Remove an outgoing organization edge by identity.
    pub fn remove_out_edge(&mut self, edge_id: Uuid) -> bool {
        let before = self.org_edges_out.len();
        self.org_edges_out.retain(|e| e.id != edge_id);
        let removed = self.org_edges_out.len() != before;
        if removed {
            self.touch();
        }
        removed
    }

    /// Remove all outgoing organization edges matching a (label, target) pair.
    pub fn remove_out_edges(&mut self, label: OrgEdgeLabel, target: &OrganizationId) {
        let before = self.org_edges_out.len();
        self.org_edges_out
            .retain(|e| !(e.label == label && &e.target == target));
        if self.org_edges_out.len() != before {
            self.touch();
        }
    }

    /// Initialize this organization's edge collections from an old instance.
    ///
    /// Used when an organization is cloned under a new identifier. Each
    /// collection is copied only when this instance's collection is still
    /// empty, and copied edges are re-pointed at this organization's id,
    /// so calling this twice (or after edges were added) never merges or
    /// duplicates anything.
    pub fn copy_all_linked_data_from(&mut self, old: &Organization) {
        if self.user_edges_in.is_empty() && !old.user_edges_in.is_empty() {
            self.user_edges_in = old
                .user_edges_in
                .iter()
                .cloned()
                .map(|mut e| {
                    e.organization_id = self.id.clone();
                    e
                })
                .collect();
        }

        if self.org_edges_in.is_empty() && !old.org_edges_in.is_empty() {
            self.org_edges_in = old
                .org_edges_in
                .iter()
                .cloned()
                .map(|mut e| {
                    e.target = self.id.clone();
                    e
                })
                .collect();
        }

        if self.org_edges_out.is_empty() && !old.org_edges_out.is_empty() {
            self.org_edges_out = old
                .org_edges_out
                .iter()
                .cloned()
                .map(|mut e| {
                    e.source = self.id.clone();
                    e
                })
                .collect();
        }

        self.touch();
    }

    fn touch(&mut self) {
        self.last_change = Utc::now();
    }
}

/// Builder producing an [`Organization`].
///
/// All display fields are optional; only the identifier is required.
/// Edges cannot be added through the builder; they go through the
/// aggregate's mutation methods after `build()`.
#[derive(Debug, Clone)]
pub struct OrganizationBuilder {
    id: OrganizationId,
    name: I18nText,
    description: I18nText,
    website: Option<String>,
    email: Option<String>,
    telephone: Option<String>,
    address: Option<Address>,
    geo_location: Option<GeoCoordinate>,
    tags: Vec<String>,
    privacy: PrivacyLevel,
    is_disabled: bool,
    data_source: Option<String>,
    crypto_hash: Option<String>,
    attached_files: Vec<AttachedFile>,
}

impl OrganizationBuilder {
    /// Creates a builder for an organization with the given identifier.
    pub fn new(id: OrganizationId) -> Self {
        Self {
            id,
            name: I18nText::new(),
            description: I18nText::new(),
            website: None,
            email: None,
            telephone: None,
            address: None,
            geo_location: None,
            tags: Vec::new(),
            privacy: PrivacyLevel::default(),
            is_disabled: false,
            data_source: None,
            crypto_hash: None,
            attached_files: Vec::new(),
        }
    }

    /// Add a translation of the display name.
    pub fn name(mut self, language: impl Into<String>, text: impl Into<String>) -> Self {
        self.name.set(language, text);
        self
    }

    /// Add a translation of the description.
    pub fn description(mut self, language: impl Into<String>, text: impl Into<String>) -> Self {
        self.description.set(language, text);
        self
    }

    /// Set the website URL.
    pub fn website(mut self, url: impl Into<String>) -> Self {
        self.website = Some(url.into());
        self
    }

    /// Set the contact e-mail address.
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Set the contact telephone number.
    pub fn telephone(mut self, telephone: impl Into<String>) -> Self {
        self.telephone = Some(telephone.into());
        self
    }

    /// Set the postal address.
    pub fn address(mut self, address: Address) -> Self {
        self.address = Some(address);
        self
    }

    /// Set the geographical position.
    pub fn geo_location(mut self, geo: GeoCoordinate) -> Self {
        self.geo_location = Some(geo);
        self
    }

    /// Add a tag.
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Set the default visibility.
    pub fn privacy(mut self, privacy: PrivacyLevel) -> Self {
        self.privacy = privacy;
        self
    }

    /// Mark the organization as disabled.
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.is_disabled = disabled;
        self
    }

    /// Record where this organization was imported from.
    pub fn data_source(mut self, source: impl Into<String>) -> Self {
        self.data_source = Some(source.into());
        self
    }

    /// Record the integrity hash of the imported record.
    pub fn crypto_hash(mut self, hash: impl Into<String>) -> Self {
        self.crypto_hash = Some(hash.into());
        self
    }

    /// Attach a file.
    pub fn attach_file(mut self, file: AttachedFile) -> Self {
        self.attached_files.push(file);
        self
    }

    /// Produce the organization with empty edge collections.
    pub fn build(self) -> Organization {
        let now = Utc::now();
        Organization {
            id: self.id,
            name: self.name,
            description: self.description,
            website: self.website,
            email: self.email,
            telephone: self.telephone,
            address: self.address,
            geo_location: self.geo_location,
            tags: self.tags,
            privacy: self.privacy,
            is_disabled: self.is_disabled,
            data_source: self.data_source,
            crypto_hash: self.crypto_hash,
            attached_files: self.attached_files,
            created_at: now,
            last_change: now,
            user_edges_in: Vec::new(),
            org_edges_in: Vec::new(),
            org_edges_out: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn org(id: &str) -> Organization {
        Organization::builder(OrganizationId::parse(id).unwrap()).build()
    }

    fn user(id: &str) -> UserId {
        UserId::parse(id).unwrap()
    }

    #[test]
    fn test_builder_produces_empty_edge_collections() {
        let org = Organization::builder(OrganizationId::parse("acme").unwrap())
            .name("en", "Acme Corp")
            .website("https://acme.example")
            .tag("energy")
            .build();

        assert_eq!(org.id().as_str(), "acme");
        assert_eq!(org.name.get("en"), Some("Acme Corp"));
        assert!(org.user_edges().is_empty());
        assert!(!org.is_disabled);
    }

    #[test]
    fn test_role_views_filter_by_label() {
        let mut org = org("acme");
        org.link_user(user("alice"), UserEdgeLabel::IsAdmin, PrivacyLevel::World);
        org.link_user(user("bob"), UserEdgeLabel::IsMember, PrivacyLevel::World);
        org.link_user(user("carol"), UserEdgeLabel::IsGuest, PrivacyLevel::World);

        assert_eq!(org.admins(), vec![user("alice")]);
        assert_eq!(org.members(), vec![user("bob")]);
        assert_eq!(org.guests(), vec![user("carol")]);
    }

    #[test]
    fn test_user_in_two_roles_appears_in_both_views_once_in_users() {
        let mut org = org("acme");
        org.link_user(user("alice"), UserEdgeLabel::IsAdmin, PrivacyLevel::World);
        org.link_user(user("alice"), UserEdgeLabel::IsMember, PrivacyLevel::World);

        assert_eq!(org.admins(), vec![user("alice")]);
        assert_eq!(org.members(), vec![user("alice")]);
        assert_eq!(org.users(), vec![user("alice")]);
    }

    #[test]
    fn test_duplicate_link_creates_two_edges() {
        let mut org = org("acme");
        let a = org.link_user(user("alice"), UserEdgeLabel::IsMember, PrivacyLevel::World);
        let b = org.link_user(user("alice"), UserEdgeLabel::IsMember, PrivacyLevel::World);

        assert_ne!(a.id, b.id);
        assert_eq!(org.members().len(), 2);
        assert_eq!(org.users().len(), 1);
    }

    #[test]
    fn test_unlink_user_is_idempotent() {
        let mut org = org("acme");
        let edge = org.link_user(user("alice"), UserEdgeLabel::IsMember, PrivacyLevel::World);

        assert!(org.unlink_user(edge.id));
        assert!(!org.unlink_user(edge.id));
        assert!(org.members().is_empty());
    }

    #[test]
    fn test_remove_edges_by_label_and_endpoint_no_ops_when_missing() {
        let mut org = org("acme");
        let parent = OrganizationId::parse("parent").unwrap();
        org.add_out_edge(OrgEdgeLabel::IsChildOf, parent.clone(), PrivacyLevel::World);

        // Removing a pair that does not exist must not disturb anything.
        org.remove_out_edges(OrgEdgeLabel::IsSubsidiary, &parent);
        assert_eq!(org.parents(), vec![parent.clone()]);

        org.remove_out_edges(OrgEdgeLabel::IsChildOf, &parent);
        assert!(org.parents().is_empty());
    }

    #[test]
    fn test_parents_and_sub_organizations() {
        let mut org = org("middle");
        let parent = OrganizationId::parse("parent").unwrap();
        let child = OrganizationId::parse("child").unwrap();

        org.add_out_edge(OrgEdgeLabel::IsChildOf, parent.clone(), PrivacyLevel::World);
        org.add_in_edge(child.clone(), OrgEdgeLabel::IsChildOf, PrivacyLevel::World);

        assert_eq!(org.parents(), vec![parent]);
        assert_eq!(org.sub_organizations(), vec![child]);
    }

    #[test]
    fn test_copy_all_linked_data_initializes_once() {
        let mut old = org("old");
        old.link_user(user("alice"), UserEdgeLabel::IsAdmin, PrivacyLevel::World);
        old.add_in_edge(
            OrganizationId::parse("child").unwrap(),
            OrgEdgeLabel::IsChildOf,
            PrivacyLevel::World,
        );

        let mut renamed = org("new");
        renamed.copy_all_linked_data_from(&old);

        assert_eq!(renamed.admins(), vec![user("alice")]);
        // Copied edges point at the new identifier.
        assert!(renamed
            .user_edges()
            .iter()
            .all(|e| e.organization_id == *renamed.id()));
        assert!(renamed.in_edges().iter().all(|e| e.target == *renamed.id()));

        // A second copy never merges.
        let mut other = org("other");
        other.link_user(user("bob"), UserEdgeLabel::IsMember, PrivacyLevel::World);
        renamed.copy_all_linked_data_from(&other);
        assert_eq!(renamed.users(), vec![user("alice")]);
    }
}
