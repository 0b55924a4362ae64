//! User endpoints
//!
//! `/users` rides on standard GET plus the service's custom verbs: `ADD`
//! creates an account, `AUTH` signs in, `DEAUTH` signs out. The custom
//! verbs are dispatched by hand since they are not standard HTTP methods.

use axum::extract::{Path, Request, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Map, Value};

use users_auth::{
    expired_session_cookie, parse_session_cookie, session_cookie, LoginPassword, SignInSession,
};
use users_org::{User, UserId};

use crate::email::{email_domain_resolves, email_syntax_ok};
use crate::error::{ApiError, ApiResult};
use crate::state::SharedState;

/// Upper bound for request bodies on this route.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// `GET /users` — public accounts only.
pub async fn list_users(State(state): State<SharedState>) -> Json<Value> {
    let users = state.users.read().expect("users lock poisoned");
    let mut list: Vec<&User> = users
        .values()
        .filter(|u| u.is_public && !u.is_disabled)
        .collect();
    list.sort_by(|a, b| a.id().cmp(b.id()));
    Json(Value::Array(list.iter().map(|u| user_to_json(u)).collect()))
}

/// `GET|ADD|AUTH|DEAUTH /users/{id}`.
pub async fn user_verbs(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    request: Request,
) -> ApiResult<Response> {
    let user_id = UserId::parse(&id)
        .map_err(|_| ApiError::validation("id", "Invalid user identification!"))?;

    match request.method().as_str() {
        "GET" => get_user(state, user_id).await,
        "ADD" => add_user(state, user_id, request).await,
        "AUTH" => auth_user(state, user_id, request).await,
        "DEAUTH" => deauth_user(state, request).await,
        _ => Err(ApiError::MethodNotAllowed),
    }
}

async fn get_user(state: SharedState, user_id: UserId) -> ApiResult<Response> {
    let users = state.users.read().expect("users lock poisoned");
    // Non-public accounts are indistinguishable from absent ones.
    match users.get(&user_id) {
        Some(user) if user.is_public && !user.is_disabled => {
            Ok(Json(user_to_json(user)).into_response())
        }
        _ => Err(ApiError::NotFound("Unknown user!".into())),
    }
}

async fn add_user(state: SharedState, user_id: UserId, request: Request) -> ApiResult<Response> {
    let body = read_json_body(request).await?;

    let email = require_str(&body, "email")?;
    let password = require_str(&body, "password")?;
    // The keyring must be present in the document; its content is not
    // processed here.
    require_str(&body, "gpgpublickeyring")?;

    if user_id.len() < state.config.min_username_length {
        return Err(ApiError::validation("username", "The username is too short!"));
    }
    if !email_syntax_ok(&email) {
        return Err(ApiError::validation("email", "Invalid e-mail address!"));
    }
    if state.config.validate_email_dns && !email_domain_resolves(&email).await {
        return Err(ApiError::validation(
            "email",
            "The e-mail domain does not resolve!",
        ));
    }
    if password.chars().count() < state.config.min_password_length {
        return Err(ApiError::validation("password", "The password is too short!"));
    }

    // Check-then-insert runs under the write locks, so two concurrent
    // sign-ups for the same login cannot both succeed.
    let (user, token) = {
        let mut users = state.users.write().expect("users lock poisoned");
        let mut passwords = state.passwords.write().expect("passwords lock poisoned");
        if users.contains_key(&user_id) {
            return Err(ApiError::Conflict("The given login already exists!".into()));
        }
        let user = User::new(user_id.clone(), email);
        users.insert(user_id.clone(), user.clone());
        passwords.insert(
            user_id.clone(),
            LoginPassword::new(user_id.clone(), &password, None),
        );
        let token = state.verification_tokens.create(user_id);
        (user, token)
    };

    let verification_url = format!(
        "{}/verificationtokens/{}",
        state.config.external_url, token.token
    );
    let mail_sent = match state.mailer.send_signup(&user, &verification_url).await {
        Ok(()) => true,
        Err(error) => {
            // The account stays; only the response variant changes.
            tracing::warn!(user = %user.id(), %error, "signup mail failed");
            false
        }
    };

    let mut response = user_to_json(&user);
    if let Value::Object(map) = &mut response {
        map.insert("verificationMailSent".into(), Value::Bool(mail_sent));
    }
    Ok((StatusCode::CREATED, Json(response)).into_response())
}

async fn auth_user(state: SharedState, user_id: UserId, request: Request) -> ApiResult<Response> {
    let body = read_json_body(request).await?;

    let login_text = require_str(&body, "login")?;
    let password = require_str(&body, "password")?;
    let realm = match body.get("realm") {
        None | Some(Value::Null) => None,
        Some(Value::String(realm)) => Some(realm.clone()),
        Some(_) => return Err(ApiError::validation("realm", "The realm must be a string!")),
    };

    let login = UserId::parse(&login_text)
        .map_err(|_| ApiError::validation("login", "Invalid login!"))?;
    if login.len() < state.config.min_username_length {
        return Err(ApiError::validation("login", "The login is too short!"));
    }
    if login != user_id {
        return Err(ApiError::validation(
            "login",
            "The login does not match the URL!",
        ));
    }
    if password.chars().count() < state.config.min_password_length {
        return Err(ApiError::validation("password", "The password is too short!"));
    }
    if let Some(realm) = &realm {
        if realm.chars().count() < state.config.min_realm_length {
            return Err(ApiError::validation("realm", "The realm is too short!"));
        }
    }

    let username = {
        let users = state.users.read().expect("users lock poisoned");
        let passwords = state.passwords.read().expect("passwords lock poisoned");

        let verified = passwords
            .get(&login)
            .map(|record| record.verify(&password))
            .unwrap_or(false);
        if !verified {
            return Err(ApiError::Unauthorized("Invalid login or password!".into()));
        }
        let user = users
            .get(&login)
            .ok_or_else(|| ApiError::Unauthorized("Invalid login or password!".into()))?;
        if user.is_disabled {
            return Err(ApiError::Forbidden("The account is disabled!".into()));
        }
        user.name.clone()
    };

    // The caller-supplied realm travels into the session unchanged.
    let session = SignInSession::new(login.clone(), realm, state.config.session_lifetime);
    let cookie = session_cookie(
        login.as_str(),
        &username,
        &session.token,
        state.config.session_lifetime,
    );
    state.sessions.insert(session);

    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, cookie)],
        Json(json!({ "login": login.as_str(), "username": username })),
    )
        .into_response())
}

async fn deauth_user(state: SharedState, request: Request) -> ApiResult<Response> {
    if let Some(cookie) = request
        .headers()
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
    {
        if let Some((_, _, token)) = parse_session_cookie(cookie) {
            state.sessions.revoke(&token);
        }
    }

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, expired_session_cookie())],
        Json(json!({ "description": "Signed out." })),
    )
        .into_response())
}

/// Public JSON view of a user.
pub fn user_to_json(user: &User) -> Value {
    let mut out = Map::new();
    out.insert("@id".into(), Value::String(user.id().to_string()));
    out.insert("name".into(), Value::String(user.name.clone()));
    out.insert("email".into(), Value::String(user.email.clone()));
    if let Some(telephone) = &user.telephone {
        out.insert("telephone".into(), Value::String(telephone.clone()));
    }
    if !user.description.is_empty() {
        out.insert(
            "description".into(),
            serde_json::to_value(&user.description).unwrap_or(Value::Null),
        );
    }
    out.insert("isAuthenticated".into(), Value::Bool(user.is_authenticated));
    Value::Object(out)
}

async fn read_json_body(request: Request) -> ApiResult<Value> {
    let bytes = axum::body::to_bytes(request.into_body(), MAX_BODY_BYTES)
        .await
        .map_err(|_| ApiError::bad_request("Could not read the request body!"))?;
    serde_json::from_slice(&bytes)
        .map_err(|_| ApiError::bad_request("The request body is not valid JSON!"))
}

fn require_str(body: &Value, key: &str) -> ApiResult<String> {
    match body.get(key) {
        Some(Value::String(text)) if !text.trim().is_empty() => Ok(text.clone()),
        Some(Value::String(_)) | None | Some(Value::Null) => Err(ApiError::validation(
            key,
            format!("Missing property \"{key}\"!"),
        )),
        Some(_) => Err(ApiError::validation(
            key,
            format!("The property \"{key}\" must be a string!"),
        )),
    }
}
