//! Organization JSON codec
//!
//! Serialization with per-relationship expansion control, and validated
//! parsing of inbound organization documents. Parsing never panics: every
//! failure comes back as a [`ParseError`] naming the offending property
//! where one exists.

use serde_json::{json, Map, Value};

use crate::edge::PrivacyLevel;
use crate::error::ParseError;
use crate::graph::OrganizationGraph;
use crate::ids::{OrganizationId, UserId};
use crate::organization::{Address, GeoCoordinate, I18nText, Organization};

/// JSON-LD context URIs accepted on inbound organization documents.
pub const JSONLD_CONTEXTS: [&str; 2] = [
    "https://opendata.social/contexts/UsersAPI/organization",
    "http://opendata.social/contexts/UsersAPI/organization",
];

/// How a list-valued relationship is rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExpandMode {
    /// Render as an array of id strings
    #[default]
    ShowIdOnly,

    /// Render as an array of embedded objects
    Expand,
}

impl ExpandMode {
    /// Whether this mode embeds full objects.
    pub fn is_expanded(&self) -> bool {
        matches!(self, Self::Expand)
    }
}

/// Serialization options for [`organization_to_json`].
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonOptions {
    /// Whether the object is embedded in a surrounding document
    /// (embedded objects omit the `@context` key)
    pub embedded: bool,

    /// Rendering of the admins/members/guests lists
    pub expand_members: ExpandMode,

    /// Rendering of the parents list
    pub expand_parents: ExpandMode,

    /// Rendering of the sub-organizations list
    pub expand_sub_organizations: ExpandMode,

    /// Rendering of the tags list (expanded tags become objects)
    pub expand_tags: ExpandMode,

    /// Whether to include the `lastChange` timestamp
    pub include_last_change: bool,

    /// Whether to include the `cryptoHash` field
    pub include_crypto_hash: bool,
}

impl JsonOptions {
    /// Options with every relationship expanded and every optional field included.
    pub fn expand_all() -> Self {
        Self {
            embedded: false,
            expand_members: ExpandMode::Expand,
            expand_parents: ExpandMode::Expand,
            expand_sub_organizations: ExpandMode::Expand,
            expand_tags: ExpandMode::Expand,
            include_last_change: true,
            include_crypto_hash: true,
        }
    }
}

/// Resolves a user id to an embeddable JSON object.
pub type UserResolver<'a> = &'a dyn Fn(&UserId) -> Option<Value>;

/// Post-processor that fully overrides the default serialization.
pub type CustomSerializer<'a> = &'a dyn Fn(Value) -> Value;

/// Serialize an organization.
///
/// Optional fields that are unset or empty are omitted entirely; the
/// output never contains null values.
pub fn organization_to_json(
    graph: &OrganizationGraph,
    org: &Organization,
    options: &JsonOptions,
) -> Value {
    organization_to_json_with(graph, org, options, None, None)
}

/// Serialize an organization with user embedding and post-processing hooks.
///
/// `resolve_user` supplies embedded user objects when the member lists are
/// expanded; without it, expanded user lists fall back to id strings.
/// `custom`, when present, receives the default object and its return
/// value replaces the output entirely.
pub fn organization_to_json_with(
    graph: &OrganizationGraph,
    org: &Organization,
    options: &JsonOptions,
    resolve_user: Option<UserResolver<'_>>,
    custom: Option<CustomSerializer<'_>>,
) -> Value {
    let mut out = Map::new();

    out.insert("@id".into(), Value::String(org.id().to_string()));
    if !options.embedded {
        out.insert("@context".into(), Value::String(JSONLD_CONTEXTS[0].into()));
    }

    if !org.name.is_empty() {
        out.insert("name".into(), i18n_to_json(&org.name));
    }
    if !org.description.is_empty() {
        out.insert("description".into(), i18n_to_json(&org.description));
    }
    if let Some(website) = &org.website {
        out.insert("website".into(), Value::String(website.clone()));
    }
    if let Some(email) = &org.email {
        out.insert("email".into(), Value::String(email.clone()));
    }
    if let Some(telephone) = &org.telephone {
        out.insert("telephone".into(), Value::String(telephone.clone()));
    }
    if let Some(geo) = &org.geo_location {
        out.insert(
            "geoLocation".into(),
            json!({ "latitude": geo.latitude, "longitude": geo.longitude }),
        );
    }
    if let Some(address) = &org.address {
        if !address.is_empty() {
            out.insert("address".into(), address_to_json(address));
        }
    }
    if !org.tags.is_empty() {
        let tags: Vec<Value> = if options.expand_tags.is_expanded() {
            org.tags.iter().map(|t| json!({ "name": t })).collect()
        } else {
            org.tags.iter().map(|t| Value::String(t.clone())).collect()
        };
        out.insert("tags".into(), Value::Array(tags));
    }

    out.insert(
        "privacyLevel".into(),
        Value::String(org.privacy.as_str().into()),
    );
    out.insert("isDisabled".into(), Value::Bool(org.is_disabled));

    if let Some(source) = &org.data_source {
        out.insert("dataSource".into(), Value::String(source.clone()));
    }
    if options.include_crypto_hash {
        if let Some(hash) = &org.crypto_hash {
            out.insert("cryptoHash".into(), Value::String(hash.clone()));
        }
    }
    if options.include_last_change {
        out.insert(
            "lastChange".into(),
            Value::String(org.last_change.to_rfc3339()),
        );
    }

    insert_org_list(
        &mut out,
        "parents",
        graph,
        &org.parents(),
        options.expand_parents,
    );
    insert_org_list(
        &mut out,
        "subOrganizations",
        graph,
        &org.sub_organizations(),
        options.expand_sub_organizations,
    );
    insert_user_list(&mut out, "admins", &org.admins(), options.expand_members, resolve_user);
    insert_user_list(&mut out, "members", &org.members(), options.expand_members, resolve_user);
    insert_user_list(&mut out, "guests", &org.guests(), options.expand_members, resolve_user);

    let value = Value::Object(out);
    match custom {
        Some(serializer) => serializer(value),
        None => value,
    }
}

fn i18n_to_json(text: &I18nText) -> Value {
    Value::Object(
        text.iter()
            .map(|(lang, value)| (lang.to_owned(), Value::String(value.to_owned())))
            .collect(),
    )
}

fn address_to_json(address: &Address) -> Value {
    let mut out = Map::new();
    if let Some(street) = &address.street {
        out.insert("street".into(), Value::String(street.clone()));
    }
    if let Some(postal_code) = &address.postal_code {
        out.insert("postalCode".into(), Value::String(postal_code.clone()));
    }
    if let Some(city) = &address.city {
        out.insert("city".into(), Value::String(city.clone()));
    }
    if let Some(country) = &address.country {
        out.insert("country".into(), Value::String(country.clone()));
    }
    Value::Object(out)
}

fn insert_org_list(
    out: &mut Map<String, Value>,
    key: &str,
    graph: &OrganizationGraph,
    ids: &[OrganizationId],
    mode: ExpandMode,
) {
    if ids.is_empty() {
        return;
    }
    let rendered: Vec<Value> = ids
        .iter()
        .map(|id| match (mode, graph.get(id)) {
            (ExpandMode::Expand, Some(linked)) => {
                // Embedded organizations render id-only relationships to
                // keep the expansion depth at one level.
                let embedded = JsonOptions {
                    embedded: true,
                    ..JsonOptions::default()
                };
                organization_to_json(graph, linked, &embedded)
            }
            _ => Value::String(id.to_string()),
        })
        .collect();
    out.insert(key.into(), Value::Array(rendered));
}

fn insert_user_list(
    out: &mut Map<String, Value>,
    key: &str,
    ids: &[UserId],
    mode: ExpandMode,
    resolve_user: Option<UserResolver<'_>>,
) {
    if ids.is_empty() {
        return;
    }
    let rendered: Vec<Value> = ids
        .iter()
        .map(|id| {
            if mode.is_expanded() {
                if let Some(resolved) = resolve_user.and_then(|resolve| resolve(id)) {
                    return resolved;
                }
            }
            Value::String(id.to_string())
        })
        .collect();
    out.insert(key.into(), Value::Array(rendered));
}

// ----------------------------------------------------------------------
// Parsing
// ----------------------------------------------------------------------

/// Parse an inbound organization document.
///
/// Mandatory: `name` and a `@context` from the allow-list. The identifier
/// comes from the body's `@id`, the URL, or both; when both are present
/// they must agree (case-insensitively). Edges are not reconstructed from
/// the document; the result has empty edge collections.
pub fn parse_organization(
    json: &Value,
    url_id: Option<&OrganizationId>,
) -> Result<Organization, ParseError> {
    let doc = json
        .as_object()
        .ok_or_else(|| ParseError::msg("The given JSON is not an object!"))?;

    let context = doc
        .get("@context")
        .and_then(Value::as_str)
        .ok_or_else(|| ParseError::on("@context", "Missing JSON-LD context!"))?;
    if !JSONLD_CONTEXTS.contains(&context) {
        return Err(ParseError::on("@context", "Unknown JSON-LD context!"));
    }

    let body_id = match doc.get("@id") {
        None => None,
        Some(value) => {
            let text = value
                .as_str()
                .ok_or_else(|| ParseError::on("@id", "The organization identification must be a string!"))?;
            Some(
                OrganizationId::parse(text)
                    .map_err(|_| ParseError::on("@id", "Invalid organization identification!"))?,
            )
        }
    };

    let id = match (body_id, url_id) {
        (Some(body), Some(url)) if &body == url => body,
        (Some(_), Some(_)) => {
            return Err(ParseError::on(
                "@id",
                "The organization identification within the JSON body does not match the one given in the URL!",
            ))
        }
        (Some(body), None) => body,
        (None, Some(url)) => url.clone(),
        (None, None) => {
            return Err(ParseError::on("@id", "Missing organization identification!"))
        }
    };

    let name = parse_i18n(doc.get("name"), "name")?
        .ok_or_else(|| ParseError::on("name", "Missing property \"name\"!"))?;

    let mut builder = Organization::builder(id);
    for (lang, text) in name.iter() {
        builder = builder.name(lang, text);
    }

    if let Some(description) = parse_i18n(doc.get("description"), "description")? {
        for (lang, text) in description.iter() {
            builder = builder.description(lang, text);
        }
    }
    if let Some(website) = opt_str(doc, "website")? {
        builder = builder.website(website);
    }
    if let Some(email) = opt_str(doc, "email")? {
        if !email.contains('@') {
            return Err(ParseError::on("email", "Invalid e-mail address!"));
        }
        builder = builder.email(email);
    }
    if let Some(telephone) = opt_str(doc, "telephone")? {
        builder = builder.telephone(telephone);
    }
    if let Some(geo) = doc.get("geoLocation") {
        builder = builder.geo_location(parse_geo(geo)?);
    }
    if let Some(address) = doc.get("address") {
        builder = builder.address(parse_address(address)?);
    }
    if let Some(privacy) = opt_str(doc, "privacyLevel")? {
        let privacy = PrivacyLevel::parse(&privacy)
            .ok_or_else(|| ParseError::on("privacyLevel", "Invalid privacy level!"))?;
        builder = builder.privacy(privacy);
    }
    if let Some(disabled) = doc.get("isDisabled") {
        let disabled = disabled
            .as_bool()
            .ok_or_else(|| ParseError::on("isDisabled", "The disabled flag must be a boolean!"))?;
        builder = builder.disabled(disabled);
    }
    if let Some(source) = opt_str(doc, "dataSource")? {
        builder = builder.data_source(source);
    }
    if let Some(hash) = opt_str(doc, "cryptoHash")? {
        builder = builder.crypto_hash(hash);
    }
    if let Some(tags) = doc.get("tags") {
        let tags = tags
            .as_array()
            .ok_or_else(|| ParseError::on("tags", "Tags must be an array of strings!"))?;
        for tag in tags {
            // Accept both the id-only and the expanded tag rendering.
            let tag = match tag {
                Value::String(text) => text.as_str(),
                Value::Object(map) => map
                    .get("name")
                    .and_then(Value::as_str)
                    .ok_or_else(|| ParseError::on("tags", "Tags must be an array of strings!"))?,
                _ => return Err(ParseError::on("tags", "Tags must be an array of strings!")),
            };
            builder = builder.tag(tag);
        }
    }

    Ok(builder.build())
}

fn opt_str(doc: &Map<String, Value>, key: &str) -> Result<Option<String>, ParseError> {
    match doc.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.clone())),
        Some(_) => Err(ParseError::on(
            key,
            format!("The property \"{key}\" must be a string!"),
        )),
    }
}

/// Multi-language text is either a plain string (taken as English) or a
/// language-tag → text object.
fn parse_i18n(value: Option<&Value>, key: &str) -> Result<Option<I18nText>, ParseError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(I18nText::with("en", text.clone()))),
        Some(Value::Object(map)) => {
            let mut out = I18nText::new();
            for (lang, text) in map {
                let text = text.as_str().ok_or_else(|| {
                    ParseError::on(key, format!("The property \"{key}\" must map languages to strings!"))
                })?;
                out.set(lang.clone(), text);
            }
            if out.is_empty() {
                return Err(ParseError::on(key, format!("The property \"{key}\" must not be empty!")));
            }
            Ok(Some(out))
        }
        Some(_) => Err(ParseError::on(
            key,
            format!("The property \"{key}\" must be a string or a language map!"),
        )),
    }
}

fn parse_geo(value: &Value) -> Result<GeoCoordinate, ParseError> {
    let invalid = || ParseError::on("geoLocation", "Invalid geographical coordinate!");
    let geo = value.as_object().ok_or_else(invalid)?;
    let latitude = geo.get("latitude").and_then(Value::as_f64).ok_or_else(invalid)?;
    let longitude = geo.get("longitude").and_then(Value::as_f64).ok_or_else(invalid)?;
    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return Err(invalid());
    }
    Ok(GeoCoordinate { latitude, longitude })
}

fn parse_address(value: &Value) -> Result<Address, ParseError> {
    let doc = value
        .as_object()
        .ok_or_else(|| ParseError::on("address", "The address must be an object!"))?;
    Ok(Address {
        street: opt_str(doc, "street")?,
        postal_code: opt_str(doc, "postalCode")?,
        city: opt_str(doc, "city")?,
        country: opt_str(doc, "country")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::{OrgEdgeLabel, UserEdgeLabel};

    fn id(s: &str) -> OrganizationId {
        OrganizationId::parse(s).unwrap()
    }

    fn sample_org() -> Organization {
        Organization::builder(id("acme"))
            .name("en", "Acme Corp")
            .description("en", "Open data for everyone")
            .website("https://acme.example")
            .email("info@acme.example")
            .tag("energy")
            .build()
    }

    #[test]
    fn test_to_json_omits_empty_fields() {
        let graph = OrganizationGraph::new();
        let org = Organization::builder(id("bare")).build();
        let json = organization_to_json(&graph, &org, &JsonOptions::default());

        let doc = json.as_object().unwrap();
        assert!(doc.contains_key("@id"));
        assert!(doc.contains_key("@context"));
        assert!(!doc.contains_key("name"));
        assert!(!doc.contains_key("website"));
        assert!(!doc.contains_key("lastChange"));
        assert!(doc.values().all(|v| !v.is_null()));
    }

    #[test]
    fn test_embedded_objects_omit_context() {
        let graph = OrganizationGraph::new();
        let org = sample_org();
        let options = JsonOptions {
            embedded: true,
            ..JsonOptions::default()
        };
        let json = organization_to_json(&graph, &org, &options);
        assert!(json.get("@context").is_none());
    }

    #[test]
    fn test_relationship_expansion_modes() {
        let mut graph = OrganizationGraph::new();
        graph.insert(Organization::builder(id("parent")).name("en", "Parent").build());
        let mut org = sample_org();
        org.add_out_edge(OrgEdgeLabel::IsChildOf, id("parent"), Default::default());
        org.link_user(
            UserId::parse("alice").unwrap(),
            UserEdgeLabel::IsMember,
            Default::default(),
        );

        let json = organization_to_json(&graph, &org, &JsonOptions::default());
        assert_eq!(json["parents"], json!(["parent"]));
        assert_eq!(json["members"], json!(["alice"]));

        let expanded = organization_to_json(&graph, &org, &JsonOptions::expand_all());
        assert_eq!(expanded["parents"][0]["@id"], json!("parent"));
        assert_eq!(expanded["parents"][0]["name"]["en"], json!("Parent"));
        // No user resolver given: expanded member lists fall back to ids.
        assert_eq!(expanded["members"], json!(["alice"]));
    }

    #[test]
    fn test_custom_serializer_overrides_output() {
        let graph = OrganizationGraph::new();
        let org = sample_org();
        let custom = |value: Value| json!({ "wrapped": value["@id"] });
        let json = organization_to_json_with(
            &graph,
            &org,
            &JsonOptions::default(),
            None,
            Some(&custom),
        );
        assert_eq!(json, json!({ "wrapped": "acme" }));
    }

    #[test]
    fn test_parse_requires_context_and_name() {
        let missing_context = json!({ "@id": "acme", "name": "Acme" });
        let err = parse_organization(&missing_context, None).unwrap_err();
        assert_eq!(err.property.as_deref(), Some("@context"));

        let bad_context = json!({
            "@id": "acme",
            "@context": "https://example.org/other",
            "name": "Acme"
        });
        let err = parse_organization(&bad_context, None).unwrap_err();
        assert_eq!(err.property.as_deref(), Some("@context"));

        let missing_name = json!({ "@id": "acme", "@context": JSONLD_CONTEXTS[0] });
        let err = parse_organization(&missing_name, None).unwrap_err();
        assert_eq!(err.property.as_deref(), Some("name"));
    }

    #[test]
    fn test_parse_id_cross_check() {
        let doc = json!({
            "@id": "acme",
            "@context": JSONLD_CONTEXTS[0],
            "name": "Acme"
        });

        // Equal ids (case-insensitively) are fine.
        let org = parse_organization(&doc, Some(&id("ACME"))).unwrap();
        assert_eq!(org.id(), &id("acme"));

        // Conflicting ids fail with a descriptive error.
        let err = parse_organization(&doc, Some(&id("other"))).unwrap_err();
        assert!(err.description.contains("does not match"));

        // No id anywhere fails.
        let no_id = json!({ "@context": JSONLD_CONTEXTS[0], "name": "Acme" });
        assert!(parse_organization(&no_id, None).is_err());

        // URL id alone is sufficient.
        let org = parse_organization(&no_id, Some(&id("acme"))).unwrap();
        assert_eq!(org.id(), &id("acme"));
    }

    #[test]
    fn test_parse_validates_optional_fields() {
        let bad_email = json!({
            "@id": "acme",
            "@context": JSONLD_CONTEXTS[0],
            "name": "Acme",
            "email": "not-an-email"
        });
        let err = parse_organization(&bad_email, None).unwrap_err();
        assert_eq!(err.property.as_deref(), Some("email"));

        let bad_geo = json!({
            "@id": "acme",
            "@context": JSONLD_CONTEXTS[0],
            "name": "Acme",
            "geoLocation": { "latitude": 120.0, "longitude": 0.0 }
        });
        let err = parse_organization(&bad_geo, None).unwrap_err();
        assert_eq!(err.property.as_deref(), Some("geoLocation"));

        let bad_privacy = json!({
            "@id": "acme",
            "@context": JSONLD_CONTEXTS[0],
            "name": "Acme",
            "privacyLevel": "everyone"
        });
        let err = parse_organization(&bad_privacy, None).unwrap_err();
        assert_eq!(err.property.as_deref(), Some("privacyLevel"));
    }

    #[test]
    fn test_round_trip_preserves_core_fields() {
        let graph = OrganizationGraph::new();
        let mut org = sample_org();
        org.is_disabled = true;

        let json = organization_to_json(&graph, &org, &JsonOptions::expand_all());
        let parsed = parse_organization(&json, None).unwrap();

        assert_eq!(parsed.id(), org.id());
        assert_eq!(parsed.name, org.name);
        assert_eq!(parsed.website, org.website);
        assert_eq!(parsed.email, org.email);
        assert_eq!(parsed.is_disabled, org.is_disabled);
    }
}
