//! Shared application state
//!
//! One [`AppState`] is constructed at startup and handed to every request
//! handler; it replaces ambient global registries with an explicit
//! repository object. Each mutating operation takes a single write-lock
//! acquisition, so multi-step sequences like "check login free, then
//! insert" are atomic.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use axum::http::HeaderMap;

use users_auth::{parse_session_cookie, LoginPassword, SessionStore, VerificationTokenStore};
use users_org::{Group, GroupId, NotificationStore, OrganizationGraph, User, UserId};

use crate::config::UsersApiConfig;
use crate::email::{NotificationSender, NullSender, SmtpSender};

/// Shared, request-facing application state.
pub struct AppState {
    /// Service configuration
    pub config: UsersApiConfig,

    /// User accounts keyed by id
    pub users: RwLock<HashMap<UserId, User>>,

    /// User groups keyed by id
    pub groups: RwLock<HashMap<GroupId, Group>>,

    /// The organization graph
    pub graph: RwLock<OrganizationGraph>,

    /// Login/password records keyed by login
    pub passwords: RwLock<HashMap<UserId, LoginPassword>>,

    /// Active sign-in sessions
    pub sessions: SessionStore,

    /// Pending e-mail verification tokens
    pub verification_tokens: VerificationTokenStore,

    /// Per-entity notifications
    pub notifications: NotificationStore,

    /// Outgoing mail capability
    pub mailer: Arc<dyn NotificationSender>,
}

/// Handle passed to handlers via axum state.
pub type SharedState = Arc<AppState>;

impl AppState {
    /// Build the state from configuration.
    ///
    /// Mail delivery uses SMTP when configured and the failing-softly
    /// [`NullSender`] otherwise.
    pub fn new(config: UsersApiConfig) -> SharedState {
        let mailer: Arc<dyn NotificationSender> = match &config.smtp {
            Some(smtp) => match SmtpSender::new(smtp, &config.service_name, config.admin_email.clone()) {
                Ok(sender) => Arc::new(sender),
                Err(error) => {
                    tracing::warn!(%error, "SMTP setup failed, mail disabled");
                    Arc::new(NullSender)
                }
            },
            None => Arc::new(NullSender),
        };
        Self::with_mailer(config, mailer)
    }

    /// Build the state with an explicit mail capability (used by tests).
    pub fn with_mailer(config: UsersApiConfig, mailer: Arc<dyn NotificationSender>) -> SharedState {
        Arc::new(Self {
            config,
            users: RwLock::new(HashMap::new()),
            groups: RwLock::new(HashMap::new()),
            graph: RwLock::new(OrganizationGraph::new()),
            passwords: RwLock::new(HashMap::new()),
            sessions: SessionStore::new(),
            verification_tokens: VerificationTokenStore::new(),
            notifications: NotificationStore::new(),
            mailer,
        })
    }

    /// Resolve the signed-in user from a request's Cookie header.
    ///
    /// Returns `None` for anonymous requests, unknown tokens, and expired
    /// sessions.
    pub fn session_user(&self, headers: &HeaderMap) -> Option<UserId> {
        let cookie = headers.get(axum::http::header::COOKIE)?.to_str().ok()?;
        let (_, _, token) = parse_session_cookie(cookie)?;
        let session = self.sessions.lookup(&token)?;
        Some(session.user_id)
    }
}
