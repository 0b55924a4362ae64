//! E-mail verification endpoint
//!
//! Visiting the mailed link consumes the token and activates the account.
//! The token is single-use: consumption removes it under the store lock
//! before any other work happens.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde_json::json;

use users_org::Notification;

use crate::error::ApiError;
use crate::state::SharedState;

/// `GET /verificationtokens/{token}`.
pub async fn verify(State(state): State<SharedState>, Path(token): Path<String>) -> Response {
    let Some(entry) = state.verification_tokens.take(&token) else {
        return ApiError::NotFound("Unknown verification token!".into()).into_response();
    };

    let user = {
        let mut users = state.users.write().expect("users lock poisoned");
        match users.get_mut(&entry.user_id) {
            Some(user) => {
                user.is_authenticated = true;
                user.clone()
            }
            None => return ApiError::NotFound("Unknown user!".into()).into_response(),
        }
    };

    state.notifications.add(
        user.id().as_str(),
        Notification::new("accountVerified", "Your e-mail address was verified."),
    );

    let welcome_sent = match state.mailer.send_welcome(&user).await {
        Ok(()) => true,
        Err(error) => {
            tracing::warn!(user = %user.id(), %error, "welcome mail failed");
            false
        }
    };
    if let Err(error) = state
        .mailer
        .send_admin_notice(
            &format!("{}: new user signed up", state.config.service_name),
            &format!("User {} verified their e-mail address.", user.id()),
        )
        .await
    {
        tracing::debug!(%error, "admin notice failed");
    }

    if welcome_sent {
        Html(format!(
            "<html><body><h1>Welcome to {}!</h1>\
             <p>Your account <b>{}</b> is now active.</p></body></html>",
            state.config.service_name,
            user.id()
        ))
        .into_response()
    } else {
        // Activation succeeded regardless; only the response shape differs.
        (
            StatusCode::OK,
            Json(json!({
                "@id": user.id().as_str(),
                "description": "Account activated, but the welcome e-mail could not be delivered."
            })),
        )
            .into_response()
    }
}
