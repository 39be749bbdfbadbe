use serde::{Deserialize, Serialize};
use std::sync::RwLock;
use tokio::sync::broadcast;
use tracing::info;

/// Profile of the signed-in admin, as returned by the backend at sign-in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AdminProfile {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// A credential was stored (sign-in or token refresh).
    Updated,
    /// The session ended, either by logout or because the backend rejected
    /// the admin token. Subscribers should drop any privileged state and
    /// send the operator back to the sign-in screen.
    Invalidated,
}

#[derive(Debug, Clone)]
struct Credentials {
    token: String,
    profile: Option<AdminProfile>,
}

/// Holder of the bearer credential and admin profile shared by every
/// service in the client.
///
/// The credential is injected via [`SessionStore::set`]; issuing it is the
/// backend's business. Modules that need the token receive the store
/// explicitly rather than reading ambient global state, and can subscribe
/// to learn when the session is invalidated.
pub struct SessionStore {
    inner: RwLock<Option<Credentials>>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionStore {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            inner: RwLock::new(None),
            events,
        }
    }

    /// The current bearer token, if any. Absence is a valid state: some
    /// read endpoints tolerate anonymous calls.
    pub fn token(&self) -> Option<String> {
        self.inner
            .read()
            .expect("session lock poisoned")
            .as_ref()
            .map(|credentials| credentials.token.clone())
    }

    pub fn profile(&self) -> Option<AdminProfile> {
        self.inner
            .read()
            .expect("session lock poisoned")
            .as_ref()
            .and_then(|credentials| credentials.profile.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner
            .read()
            .expect("session lock poisoned")
            .is_some()
    }

    /// Store a credential after sign-in or refresh.
    pub fn set(&self, token: String, profile: Option<AdminProfile>) {
        {
            let mut inner = self.inner.write().expect("session lock poisoned");
            *inner = Some(Credentials { token, profile });
        }
        let _ = self.events.send(SessionEvent::Updated);
    }

    /// Clear the stored credential (logout).
    pub fn clear(&self) {
        {
            let mut inner = self.inner.write().expect("session lock poisoned");
            *inner = None;
        }
        info!("Session cleared");
        let _ = self.events.send(SessionEvent::Invalidated);
    }

    /// Clear the stored credential because the backend rejected it.
    pub fn invalidate(&self) {
        {
            let mut inner = self.inner.write().expect("session lock poisoned");
            *inner = None;
        }
        info!("Session invalidated by the backend");
        let _ = self.events.send(SessionEvent::Invalidated);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trip() {
        let store = SessionStore::new();
        assert!(store.token().is_none());
        assert!(!store.is_authenticated());

        store.set("abc123".to_string(), None);
        assert_eq!(store.token().as_deref(), Some("abc123"));
        assert!(store.is_authenticated());

        store.clear();
        assert!(store.token().is_none());
    }

    #[tokio::test]
    async fn subscribers_see_invalidation() {
        let store = SessionStore::new();
        let mut events = store.subscribe();

        store.set("abc123".to_string(), None);
        store.invalidate();

        assert_eq!(events.recv().await.unwrap(), SessionEvent::Updated);
        assert_eq!(events.recv().await.unwrap(), SessionEvent::Invalidated);
        assert!(store.token().is_none());
    }

    #[test]
    fn profile_is_returned_with_credentials() {
        let store = SessionStore::new();
        let profile = AdminProfile {
            id: "1".to_string(),
            email: "ops@example.com".to_string(),
            name: Some("Ops".to_string()),
            username: None,
            role: Some("superadmin".to_string()),
        };
        store.set("abc123".to_string(), Some(profile.clone()));
        assert_eq!(store.profile(), Some(profile));
    }
}
