use std::sync::Arc;

use tracing::{info, warn};

use agrogate_core::AppResult;
use agrogate_domain::{Portal, UserProfile, home_portal};

use crate::{IdentityClient, LoginCredentials, SessionCache};

/// Result of a successful login.
#[derive(Debug, Clone, PartialEq)]
pub struct LoginOutcome {
    /// Profile snapshot returned with the token, if any.
    pub profile: Option<UserProfile>,
    /// Landing portal derived from that snapshot.
    pub home: Option<Portal>,
}

/// Application service creating and destroying sessions.
#[derive(Clone)]
pub struct SessionService {
    identity_client: Arc<dyn IdentityClient>,
}

impl SessionService {
    /// Creates a session service.
    #[must_use]
    pub fn new(identity_client: Arc<dyn IdentityClient>) -> Self {
        Self { identity_client }
    }

    /// Exchanges credentials for a token and seeds the session cache.
    pub async fn login(
        &self,
        cache: &SessionCache,
        credentials: &LoginCredentials,
    ) -> AppResult<LoginOutcome> {
        let grant = self.identity_client.login(credentials).await?;

        // A previous user's snapshot must never survive a new login.
        cache.clear_cached_profile().await?;
        cache.set_token(&grant.token).await?;

        let profile = grant.user.as_ref().map(|user| {
            let parsed = UserProfile::from_identity_payload(user);
            if !parsed.unrecognized_roles.is_empty() {
                warn!(
                    dropped = ?parsed.unrecognized_roles,
                    "login snapshot carried unknown role tags"
                );
            }
            parsed.profile
        });

        if let Some(profile) = profile.as_ref() {
            cache.set_cached_profile(profile).await?;
        }

        let home = profile
            .as_ref()
            .and_then(|profile| home_portal(profile.roles()));
        info!(
            token = %grant.token.fingerprint(),
            home = home.map_or("unresolved", |portal| portal.as_str()),
            "session started"
        );

        Ok(LoginOutcome { profile, home })
    }

    /// Destroys the session on explicit logout.
    pub async fn logout(&self, cache: &SessionCache) -> AppResult<()> {
        if let Some(token) = cache.get_token().await {
            info!(token = %token.fingerprint(), "session ended by logout");
        }

        cache.clear().await
    }

    /// Destroys the session after the account was deleted.
    pub async fn end_deleted_account_session(&self, cache: &SessionCache) -> AppResult<()> {
        if let Some(token) = cache.get_token().await {
            info!(token = %token.fingerprint(), "session ended by account deletion");
        }

        cache.clear().await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;
    use serde_json::json;

    use agrogate_core::AppError;
    use agrogate_domain::{Portal, RoleName, RoleSet, UserProfile};

    use crate::test_support::{FakeIdentityClient, cache_with_store, token};
    use crate::{CachedProfile, LoginCredentials, LoginGrant, PROFILE_KEY};

    use super::SessionService;

    fn credentials() -> LoginCredentials {
        LoginCredentials {
            username: "grower@example.com".to_owned(),
            password: "correct horse".to_owned(),
        }
    }

    #[tokio::test]
    async fn login_stores_token_and_seeds_profile() {
        let client = Arc::new(FakeIdentityClient::default().with_login(Ok(LoginGrant {
            token: token("issued-token"),
            user: Some(json!({"id": 3, "full_name": "Grower", "roles": ["End-App-User"]})),
        })));
        let (cache, _store) = cache_with_store();

        let outcome = SessionService::new(client).login(&cache, &credentials()).await;

        assert_eq!(outcome.ok().and_then(|outcome| outcome.home), Some(Portal::EndUser));
        assert_eq!(cache.get_token().await, Some(token("issued-token")));
        assert!(
            cache
                .get_cached_profile()
                .await
                .is_some_and(|cached| cached.profile.has_role(RoleName::EndAppUser))
        );
    }

    #[tokio::test]
    async fn login_without_snapshot_drops_previous_profile() {
        let client = Arc::new(FakeIdentityClient::default().with_login(Ok(LoginGrant {
            token: token("second-token"),
            user: None,
        })));
        let (cache, store) = cache_with_store();
        let previous = CachedProfile {
            profile: UserProfile::new("1", "Previous", None, RoleSet::from_iter([RoleName::Admin])),
            cached_at: Utc::now(),
        };
        store
            .put_raw(PROFILE_KEY, &serde_json::to_string(&previous).unwrap_or_default())
            .await;

        let outcome = SessionService::new(client).login(&cache, &credentials()).await;

        assert!(outcome.is_ok_and(|outcome| outcome.home.is_none()));
        assert!(cache.get_cached_profile().await.is_none());
    }

    #[tokio::test]
    async fn failed_login_leaves_session_untouched() {
        let client = Arc::new(FakeIdentityClient::default().with_login(Err(
            AppError::Unauthorized("invalid credentials".to_owned()),
        )));
        let (cache, _store) = cache_with_store();

        let outcome = SessionService::new(client).login(&cache, &credentials()).await;

        assert!(matches!(outcome, Err(AppError::Unauthorized(_))));
        assert!(cache.get_token().await.is_none());
    }

    #[tokio::test]
    async fn logout_and_account_deletion_destroy_session() {
        let client = Arc::new(FakeIdentityClient::default());
        let service = SessionService::new(client);
        let (cache, _store) = cache_with_store();

        let _ = cache.set_token(&token("t-1")).await;
        assert!(service.logout(&cache).await.is_ok());
        assert!(cache.get_token().await.is_none());

        let _ = cache.set_token(&token("t-2")).await;
        assert!(service.end_deleted_account_session(&cache).await.is_ok());
        assert!(cache.get_token().await.is_none());
    }
}
