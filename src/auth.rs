//! Session persistence and the single 401 policy point.
//!
//! The HTTP client never touches the session on its own. On a 401 it returns
//! `Error::Unauthenticated` and publishes [`SessionEvent::Unauthorized`];
//! the one [`SessionGuard`] subscribed to those events clears the persisted
//! token and user and redirects to the login entry point.

use crate::error::Result;
use crate::storage::{keys, LocalStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// The signed-in administrator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUser {
    #[serde(alias = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default = "default_role")]
    pub role: String,
}

fn default_role() -> String {
    "admin".to_string()
}

impl AdminUser {
    /// Minimal user record for backends that return only a token.
    pub fn synthesized(email: &str) -> Self {
        let name = email.split('@').next().unwrap_or("admin").to_string();
        AdminUser {
            id: String::new(),
            name,
            email: email.to_string(),
            role: default_role(),
        }
    }
}

/// Token and user persisted under the two auth storage keys.
#[derive(Clone)]
pub struct AuthStore {
    store: Arc<dyn LocalStore>,
}

impl AuthStore {
    pub fn new(store: Arc<dyn LocalStore>) -> Self {
        AuthStore { store }
    }

    /// Bearer token, if signed in. Storage failures read as signed out.
    pub fn token(&self) -> Option<String> {
        match self.store.get(keys::AUTH_TOKEN) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                warn!("Failed to read auth token: {}", e);
                None
            }
        }
    }

    pub fn user(&self) -> Option<AdminUser> {
        let text = match self.store.get(keys::AUTH_USER) {
            Ok(text) => text?,
            Err(e) => {
                warn!("Failed to read auth user: {}", e);
                return None;
            }
        };
        serde_json::from_str(&text)
            .map_err(|e| warn!("Discarding unreadable auth user: {}", e))
            .ok()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// Persist a new session.
    ///
    /// # Errors
    /// Returns `Err` if either key cannot be written.
    pub fn persist(&self, token: &str, user: &AdminUser) -> Result<()> {
        self.store.set(keys::AUTH_TOKEN, token.to_string())?;
        self.store.set(keys::AUTH_USER, serde_json::to_string(user)?)?;
        Ok(())
    }

    /// Remove the session. Failures are logged; clearing is best effort.
    pub fn clear(&self) {
        for key in [keys::AUTH_TOKEN, keys::AUTH_USER] {
            if let Err(e) = self.store.remove(key) {
                warn!("Failed to clear {}: {}", key, e);
            }
        }
    }
}

/// Session lifecycle notifications published by the client and services.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    /// A request was answered with 401.
    Unauthorized,
    /// The user signed out explicitly.
    LoggedOut,
}

/// Navigation hook owned by the embedding application.
pub trait Navigator: Send + Sync {
    fn redirect(&self, path: &str);
}

/// Listener that applies the session policy for every published event.
pub struct SessionGuard {
    auth: AuthStore,
    navigator: Option<Arc<dyn Navigator>>,
    login_path: String,
}

impl SessionGuard {
    pub fn new(auth: AuthStore, navigator: Arc<dyn Navigator>, login_path: impl Into<String>) -> Self {
        SessionGuard {
            auth,
            navigator: Some(navigator),
            login_path: login_path.into(),
        }
    }

    /// Guard that clears the session but never navigates.
    pub fn clearing(auth: AuthStore) -> Self {
        SessionGuard {
            auth,
            navigator: None,
            login_path: String::new(),
        }
    }

    /// Apply the policy for one event.
    pub fn handle(&self, event: &SessionEvent) {
        if let SessionEvent::Unauthorized = event {
            warn!("Session rejected by backend; signing out");
        }
        self.auth.clear();
        if let Some(navigator) = &self.navigator {
            navigator.redirect(&self.login_path);
        }
    }

    /// Process events until every sender is dropped.
    pub async fn run(self, mut events: broadcast::Receiver<SessionEvent>) {
        loop {
            match events.recv().await {
                Ok(event) => self.handle(&event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    // Missed events are all session-ending; one pass suffices.
                    debug!("Session guard lagged by {} events", skipped);
                    self.handle(&SessionEvent::Unauthorized);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }

    /// Run the guard on the current tokio runtime.
    pub fn spawn(self, events: broadcast::Receiver<SessionEvent>) -> JoinHandle<()> {
        tokio::spawn(self.run(events))
    }
}
