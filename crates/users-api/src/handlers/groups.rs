//! Group endpoints

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};

use users_org::{Group, GroupId};

use crate::error::{ApiError, ApiResult};
use crate::state::SharedState;

/// `GET /groups` — public groups.
pub async fn list_groups(State(state): State<SharedState>) -> Json<Value> {
    let groups = state.groups.read().expect("groups lock poisoned");
    let mut list: Vec<&Group> = groups.values().filter(|g| g.is_public).collect();
    list.sort_by(|a, b| a.id().cmp(b.id()));
    Json(Value::Array(
        list.iter().map(|g| group_to_json(g, false)).collect(),
    ))
}

/// `GET /groups/{id}`.
pub async fn group_detail(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let group_id = GroupId::parse(&id)
        .map_err(|_| ApiError::validation("id", "Invalid group identification!"))?;

    let groups = state.groups.read().expect("groups lock poisoned");
    match groups.get(&group_id) {
        Some(group) if group.is_public => Ok(Json(group_to_json(group, true)).into_response()),
        _ => Err(ApiError::NotFound("Unknown group!".into())),
    }
}

fn group_to_json(group: &Group, with_members: bool) -> Value {
    let mut out = json!({
        "@id": group.id().as_str(),
        "name": group.name,
        "memberCount": group.members.len(),
    });
    if !group.description.is_empty() {
        out["description"] = serde_json::to_value(&group.description).unwrap_or(Value::Null);
    }
    if with_members {
        out["members"] = Value::Array(
            group
                .members
                .iter()
                .map(|m| Value::String(m.to_string()))
                .collect(),
        );
    }
    out
}
