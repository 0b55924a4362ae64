//! # Users Platform HTTP Service
//!
//! The HTTP surface of the Social Open Data users service: sign-up with
//! e-mail verification, cookie sessions via the custom `AUTH`/`DEAUTH`
//! verbs, and JSON listings of users, organizations, and groups.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use users_api::{router, AppState, UsersApiConfig};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let state = AppState::new(UsersApiConfig::default());
//! let app = router(state);
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:2000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod email;
pub mod error;
pub mod handlers;
pub mod state;

use axum::routing::{any, get};
use axum::Router;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

// Re-export main types for convenience
pub use config::{SmtpConfig, UsersApiConfig};
pub use email::{NotificationSender, NullSender, SmtpSender};
pub use error::{ApiError, ApiResult};
pub use state::{AppState, SharedState};

use handlers::{groups, organizations, pages, users, verification};

/// Build the service router.
///
/// Custom verbs (`ADD`, `AUTH`, `DEAUTH`) share their paths with GET via
/// `any()` routes and explicit method dispatch.
pub fn router(state: SharedState) -> Router {
    let app = Router::new()
        .route("/signup", get(pages::signup_form))
        .route("/verificationtokens/:token", get(verification::verify))
        .route("/users", get(users::list_users))
        .route("/users/:id", any(users::user_verbs))
        .route("/organizations", get(organizations::list_organizations))
        .route("/organizations/:id", any(organizations::organization_verbs))
        .route(
            "/organizations/:id/info",
            get(organizations::organization_info),
        )
        .route("/groups", get(groups::list_groups))
        .route("/groups/:id", get(groups::group_detail));

    let app = match &state.config.www_root {
        Some(root) => app.fallback_service(ServeDir::new(root)),
        None => app.fallback(pages::landing),
    };

    app.layer(TraceLayer::new_for_http()).with_state(state)
}
