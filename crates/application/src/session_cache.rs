//! Session cache over a key/value session store.
//!
//! The cache persists two entries per browser session: the opaque token and a
//! JSON snapshot of the last known profile. Reads fail soft; a storage error or
//! an undecodable snapshot is logged and reported as a miss.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use agrogate_core::{AppError, AppResult, SessionToken};
use agrogate_domain::UserProfile;

/// Storage key holding the session token.
pub const TOKEN_KEY: &str = "token";

/// Storage key holding the cached profile snapshot.
pub const PROFILE_KEY: &str = "user";

/// Key/value storage scoped to one browser session.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Reads a value.
    async fn get_item(&self, key: &str) -> AppResult<Option<String>>;

    /// Writes a value, replacing any previous one.
    async fn set_item(&self, key: &str, value: String) -> AppResult<()>;

    /// Removes a value; removing a missing key is not an error.
    async fn remove_item(&self, key: &str) -> AppResult<()>;
}

/// Profile snapshot with the time it was written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedProfile {
    /// Snapshot as returned by the identity endpoint.
    pub profile: UserProfile,
    /// When the snapshot was written.
    pub cached_at: DateTime<Utc>,
}

impl CachedProfile {
    /// Whether the snapshot may be used without revalidation.
    ///
    /// `None` disables revalidation entirely.
    #[must_use]
    pub fn is_fresh(&self, revalidate_after: Option<Duration>, now: DateTime<Utc>) -> bool {
        let Some(revalidate_after) = revalidate_after else {
            return true;
        };

        TimeDelta::from_std(revalidate_after)
            .is_ok_and(|max_age| now.signed_duration_since(self.cached_at) < max_age)
    }
}

/// Typed access to the token and profile snapshot of one session.
#[derive(Clone)]
pub struct SessionCache {
    store: Arc<dyn SessionStore>,
}

impl SessionCache {
    /// Creates a cache over a session store.
    #[must_use]
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Returns the stored token.
    pub async fn get_token(&self) -> Option<SessionToken> {
        let raw = match self.store.get_item(TOKEN_KEY).await {
            Ok(raw) => raw?,
            Err(error) => {
                warn!(%error, "failed to read session token, treating as signed out");
                return None;
            }
        };

        SessionToken::new(raw).ok()
    }

    /// Stores a token.
    pub async fn set_token(&self, token: &SessionToken) -> AppResult<()> {
        self.store
            .set_item(TOKEN_KEY, token.expose().to_owned())
            .await
    }

    /// Removes the token.
    pub async fn clear_token(&self) -> AppResult<()> {
        self.store.remove_item(TOKEN_KEY).await
    }

    /// Returns the cached profile snapshot.
    pub async fn get_cached_profile(&self) -> Option<CachedProfile> {
        let raw = match self.store.get_item(PROFILE_KEY).await {
            Ok(raw) => raw?,
            Err(error) => {
                warn!(%error, "failed to read cached profile, treating as cache miss");
                return None;
            }
        };

        match serde_json::from_str::<CachedProfile>(&raw) {
            Ok(cached) => Some(cached),
            Err(error) => {
                warn!(%error, "cached profile is malformed, treating as cache miss");
                None
            }
        }
    }

    /// Stores a profile snapshot stamped with the current time.
    pub async fn set_cached_profile(&self, profile: &UserProfile) -> AppResult<()> {
        let cached = CachedProfile {
            profile: profile.clone(),
            cached_at: Utc::now(),
        };
        let encoded = serde_json::to_string(&cached).map_err(|error| {
            AppError::Internal(format!("failed to encode cached profile: {error}"))
        })?;

        self.store.set_item(PROFILE_KEY, encoded).await
    }

    /// Removes the profile snapshot.
    pub async fn clear_cached_profile(&self) -> AppResult<()> {
        self.store.remove_item(PROFILE_KEY).await
    }

    /// Removes token and profile snapshot.
    pub async fn clear(&self) -> AppResult<()> {
        debug!("clearing session token and cached profile");
        self.clear_token().await?;
        self.clear_cached_profile().await
    }
}

#[cfg(test)]
mod tests;
