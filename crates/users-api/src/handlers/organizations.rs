//! Organization endpoints
//!
//! Listings and details go through the JSON codec with query-controlled
//! expansion; `/info` returns the permission-pruned tree for the
//! signed-in viewer. `ADD` creates an organization from an inbound
//! JSON-LD document.

use axum::extract::{Path, Query, Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use users_org::json::{organization_to_json_with, ExpandMode, JsonOptions};
use users_org::{parse_organization, OrganizationId, OrganizationInfo, PrivacyLevel, UserId};

use crate::error::{ApiError, ApiResult};
use crate::handlers::users::user_to_json;
use crate::state::SharedState;

const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Query parameters of the organization endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct ExpandQuery {
    /// Comma-separated relationship names to embed
    pub expand: Option<String>,
}

impl ExpandQuery {
    fn options(&self) -> JsonOptions {
        let mut options = JsonOptions::default();
        for token in self
            .expand
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
        {
            match token.to_lowercase().as_str() {
                "members" => options.expand_members = ExpandMode::Expand,
                "parents" => options.expand_parents = ExpandMode::Expand,
                "suborganizations" => options.expand_sub_organizations = ExpandMode::Expand,
                "tags" => options.expand_tags = ExpandMode::Expand,
                "lastchange" => options.include_last_change = true,
                "cryptohash" => options.include_crypto_hash = true,
                _ => {}
            }
        }
        options
    }
}

/// `GET /organizations` — not-disabled organizations visible to the world.
pub async fn list_organizations(State(state): State<SharedState>) -> Json<Value> {
    let graph = state.graph.read().expect("graph lock poisoned");
    let users = state.users.read().expect("users lock poisoned");
    let resolve = |id: &UserId| users.get(id).map(|u| user_to_json(u));

    let mut orgs: Vec<&users_org::Organization> = graph
        .iter()
        .filter(|org| !org.is_disabled && org.privacy >= PrivacyLevel::Public)
        .collect();
    orgs.sort_by(|a, b| a.id().cmp(b.id()));

    let options = JsonOptions::default();
    let list = orgs
        .iter()
        .map(|org| organization_to_json_with(&graph, org, &options, Some(&resolve), None))
        .collect();
    Json(Value::Array(list))
}

/// `GET|ADD /organizations/{id}`.
pub async fn organization_verbs(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Query(query): Query<ExpandQuery>,
    request: Request,
) -> ApiResult<Response> {
    let org_id = OrganizationId::parse(&id)
        .map_err(|_| ApiError::validation("id", "Invalid organization identification!"))?;

    match request.method().as_str() {
        "GET" => organization_detail(state, org_id, query).await,
        "ADD" => add_organization(state, org_id, request).await,
        _ => Err(ApiError::MethodNotAllowed),
    }
}

async fn organization_detail(
    state: SharedState,
    org_id: OrganizationId,
    query: ExpandQuery,
) -> ApiResult<Response> {
    let graph = state.graph.read().expect("graph lock poisoned");
    let users = state.users.read().expect("users lock poisoned");
    let resolve = |id: &UserId| users.get(id).map(|u| user_to_json(u));

    let org = graph
        .get(&org_id)
        .filter(|org| !org.is_disabled)
        .ok_or_else(|| ApiError::NotFound("Unknown organization!".into()))?;

    let json = organization_to_json_with(&graph, org, &query.options(), Some(&resolve), None);
    Ok(Json(json).into_response())
}

async fn add_organization(
    state: SharedState,
    org_id: OrganizationId,
    request: Request,
) -> ApiResult<Response> {
    let bytes = axum::body::to_bytes(request.into_body(), MAX_BODY_BYTES)
        .await
        .map_err(|_| ApiError::bad_request("Could not read the request body!"))?;
    let body: Value = serde_json::from_slice(&bytes)
        .map_err(|_| ApiError::bad_request("The request body is not valid JSON!"))?;

    let organization = parse_organization(&body, Some(&org_id))?;

    let json = {
        let mut graph = state.graph.write().expect("graph lock poisoned");
        if graph.contains(organization.id()) {
            return Err(ApiError::Conflict(
                "The given organization already exists!".into(),
            ));
        }
        let json = organization_to_json_with(
            &graph,
            &organization,
            &JsonOptions::default(),
            None,
            None,
        );
        graph.insert(organization);
        json
    };

    Ok((StatusCode::CREATED, Json(json)).into_response())
}

/// `GET /organizations/{id}/info` — the pruned tree for the signed-in viewer.
pub async fn organization_info(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    let org_id = OrganizationId::parse(&id)
        .map_err(|_| ApiError::validation("id", "Invalid organization identification!"))?;
    let viewer = state
        .session_user(&headers)
        .ok_or_else(|| ApiError::Unauthorized("Not signed in!".into()))?;

    let graph = state.graph.read().expect("graph lock poisoned");
    let info = OrganizationInfo::build(&graph, &org_id, &viewer)?;
    Ok(Json(serde_json::to_value(&info).map_err(|e| ApiError::Internal(e.to_string()))?).into_response())
}
