//! Per-entity notification store
//!
//! Notifications are independent of the entity graph: an append-only
//! collection per owning entity with explicit removal. The store is
//! internally locked, so handlers on different request tasks can read and
//! mutate it concurrently.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A typed notification attached to an entity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notification {
    /// Unique notification identity
    pub id: Uuid,

    /// Notification type, e.g. `"newUserSignedUp"` or `"passwordChanged"`
    pub kind: String,

    /// Human-readable message
    pub message: String,

    /// When the notification was created
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Creates a new notification of the given kind.
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            kind: kind.into(),
            message: message.into(),
            created_at: Utc::now(),
        }
    }
}

/// Thread-safe notification store keyed by owning entity id.
///
/// # Examples
///
/// ```
/// use users_org::{Notification, NotificationStore};
///
/// let store = NotificationStore::new();
/// store.add("acme", Notification::new("newUserSignedUp", "alice joined"));
/// assert_eq!(store.of("acme").len(), 1);
/// assert!(store.of("unknown").is_empty());
/// ```
#[derive(Debug, Default)]
pub struct NotificationStore {
    inner: Mutex<HashMap<String, Vec<Notification>>>,
}

impl NotificationStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a notification for an owner.
    pub fn add(&self, owner: &str, notification: Notification) {
        let mut inner = self.inner.lock().expect("notification store poisoned");
        inner.entry(owner.to_owned()).or_default().push(notification);
    }

    /// All notifications of an owner, oldest first.
    pub fn of(&self, owner: &str) -> Vec<Notification> {
        let inner = self.inner.lock().expect("notification store poisoned");
        inner.get(owner).cloned().unwrap_or_default()
    }

    /// The owner's notifications of one kind (the type filter).
    pub fn of_kind(&self, owner: &str, kind: &str) -> Vec<Notification> {
        let inner = self.inner.lock().expect("notification store poisoned");
        inner
            .get(owner)
            .map(|all| all.iter().filter(|n| n.kind == kind).cloned().collect())
            .unwrap_or_default()
    }

    /// Remove one notification by identity; `false` when it was not there.
    pub fn remove(&self, owner: &str, id: Uuid) -> bool {
        let mut inner = self.inner.lock().expect("notification store poisoned");
        match inner.get_mut(owner) {
            Some(all) => {
                let before = all.len();
                all.retain(|n| n.id != id);
                all.len() != before
            }
            None => false,
        }
    }

    /// Drop all notifications of an owner.
    pub fn clear(&self, owner: &str) {
        let mut inner = self.inner.lock().expect("notification store poisoned");
        inner.remove(owner);
    }

    /// Initialize the new owner's notifications from an old owner.
    ///
    /// Used alongside organization rekeying: copies only when the new
    /// owner has no notifications yet, mirroring the edge-copy contract.
    pub fn copy_owner(&self, old_owner: &str, new_owner: &str) {
        let mut inner = self.inner.lock().expect("notification store poisoned");
        if inner.get(new_owner).map(|v| !v.is_empty()).unwrap_or(false) {
            return;
        }
        if let Some(existing) = inner.get(old_owner).cloned() {
            inner.insert(new_owner.to_owned(), existing);
        }
    }
}
