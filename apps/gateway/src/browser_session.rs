use std::sync::Arc;

use agrogate_application::{SessionCache, SessionStore};
use agrogate_core::{AppError, AppResult};
use async_trait::async_trait;
use tower_sessions::Session;

/// Session store port backed by the cookie-bound `tower_sessions` session.
#[derive(Clone)]
pub struct BrowserSessionStore {
    session: Session,
}

impl BrowserSessionStore {
    #[must_use]
    pub fn new(session: Session) -> Self {
        Self { session }
    }
}

#[async_trait]
impl SessionStore for BrowserSessionStore {
    async fn get_item(&self, key: &str) -> AppResult<Option<String>> {
        self.session
            .get::<String>(key)
            .await
            .map_err(|error| AppError::Internal(format!("failed to read session item: {error}")))
    }

    async fn set_item(&self, key: &str, value: String) -> AppResult<()> {
        self.session
            .insert(key, value)
            .await
            .map_err(|error| AppError::Internal(format!("failed to write session item: {error}")))
    }

    async fn remove_item(&self, key: &str) -> AppResult<()> {
        self.session
            .remove_value(key)
            .await
            .map(|_| ())
            .map_err(|error| AppError::Internal(format!("failed to remove session item: {error}")))
    }
}

/// Builds the session cache for one request.
pub fn session_cache(session: Session) -> SessionCache {
    SessionCache::new(Arc::new(BrowserSessionStore::new(session)))
}
