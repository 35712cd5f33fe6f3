//! Owns the current session and keeps it in durable storage.

use crate::core::cache::{KeyValueCollection, get_json, put_json};
use crate::core::session::{Session, User};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

pub const SESSION_STORAGE_KEY: &str = "maglo-auth";

/// Single source of truth for who is signed in.
///
/// The only transitions are [`SessionManager::set_credentials`] (anonymous to
/// authenticated) and [`SessionManager::clear`] / [`SessionManager::expire`]
/// (back to anonymous). Every transition is written through to storage while
/// the state lock is held, so storage never lags behind memory.
pub struct SessionManager {
    state: RwLock<Session>,
    storage: Arc<dyn KeyValueCollection>,
}

impl SessionManager {
    /// Restores the persisted session, starting anonymous when nothing usable
    /// is stored.
    pub async fn load(storage: Arc<dyn KeyValueCollection>) -> Self {
        let session = get_json::<Session>(storage.as_ref(), SESSION_STORAGE_KEY)
            .await
            .unwrap_or_default();
        debug!(
            authenticated = session.is_authenticated(),
            "Restored session"
        );
        Self {
            state: RwLock::new(session),
            storage,
        }
    }

    pub async fn get_token(&self) -> Option<String> {
        self.state.read().await.token().map(str::to_string)
    }

    pub async fn current_user(&self) -> Option<User> {
        self.state.read().await.user().cloned()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.is_authenticated()
    }

    pub async fn set_credentials(&self, token: impl Into<String>, user: User) {
        let mut state = self.state.write().await;
        *state = Session::authenticated(token.into(), user);
        self.persist(&state).await;
        info!("Session started");
    }

    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        *state = Session::anonymous();
        self.persist(&state).await;
        info!("Session cleared");
    }

    /// Clears the session if it is authenticated. Returns whether this call
    /// performed the transition, so concurrent callers can tell who won.
    pub async fn expire(&self) -> bool {
        let mut state = self.state.write().await;
        if !state.is_authenticated() {
            debug!("Session already anonymous, nothing to expire");
            return false;
        }
        *state = Session::anonymous();
        self.persist(&state).await;
        info!("Session expired");
        true
    }

    async fn persist(&self, session: &Session) {
        put_json(self.storage.as_ref(), SESSION_STORAGE_KEY, session, None).await;
    }
}
