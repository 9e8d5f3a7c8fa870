use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, info, warn};

use agrogate_core::SessionToken;
use agrogate_domain::{RoleResolution, RoleSet, UserProfile};

use crate::{
    CachedProfile, IdentityClient, IdentityLookupError, MountTicket, MountTracker, SessionCache,
};

use super::config::ResolverConfig;

/// Result of a resolution started for a mount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionOutcome {
    /// The mount is still current; apply the resolution.
    Resolved(RoleResolution),
    /// The mount was replaced or removed while the lookup was in flight.
    Superseded,
}

/// Application service resolving the current session's role set.
#[derive(Clone)]
pub struct RoleResolver {
    identity_client: Arc<dyn IdentityClient>,
    config: ResolverConfig,
}

impl RoleResolver {
    /// Creates a resolver over an identity client.
    #[must_use]
    pub fn new(identity_client: Arc<dyn IdentityClient>, config: ResolverConfig) -> Self {
        Self {
            identity_client,
            config,
        }
    }

    /// Resolves roles for a one-off mount that cannot be superseded.
    pub async fn resolve(&self, cache: &SessionCache) -> RoleResolution {
        let ticket = MountTracker::new().mount();
        match self.resolve_for_mount(cache, &ticket).await {
            ResolutionOutcome::Resolved(resolution) => resolution,
            ResolutionOutcome::Superseded => RoleResolution::loading(),
        }
    }

    /// Resolves roles for a mount, discarding the result if the mount went away.
    ///
    /// A discarded resolution applies none of its side effects: the cache is not
    /// written and the session is not cleared.
    pub async fn resolve_for_mount(
        &self,
        cache: &SessionCache,
        ticket: &MountTicket,
    ) -> ResolutionOutcome {
        let Some(token) = cache.get_token().await else {
            return ResolutionOutcome::Resolved(RoleResolution::signed_out());
        };

        let cached = usable(cache.get_cached_profile().await);
        if let Some(cached) = cached.as_ref() {
            if cached.is_fresh(self.config.revalidate_after, Utc::now()) {
                debug!(token = %token.fingerprint(), "roles resolved from cached profile");
                return ResolutionOutcome::Resolved(RoleResolution::resolved(
                    cached.profile.roles().clone(),
                ));
            }

            debug!(
                token = %token.fingerprint(),
                cached_at = %cached.cached_at,
                "cached profile is stale, revalidating"
            );
        }

        let lookup = self.lookup(&token).await;
        if !ticket.is_current() {
            debug!(
                generation = ticket.generation(),
                "discarding role resolution for superseded mount"
            );
            return ResolutionOutcome::Superseded;
        }

        let resolution = match lookup {
            Ok(payload) => accept_identity(cache, &token, &payload).await,
            Err(IdentityLookupError::Rejected(status)) => {
                info!(
                    token = %token.fingerprint(),
                    status,
                    "identity endpoint rejected session token, signing out"
                );
                clear_session(cache).await;
                RoleResolution::signed_out()
            }
            Err(error @ IdentityLookupError::Status(_)) => {
                warn!(%error, "identity lookup failed, keeping session");
                // Role-less but authenticated, unless a stale snapshot still knows better.
                RoleResolution::resolved(
                    cached.map_or_else(RoleSet::new, |cached| cached.profile.roles().clone()),
                )
            }
            Err(
                error @ (IdentityLookupError::Transport(_) | IdentityLookupError::TimedOut(_)),
            ) => {
                warn!(%error, "identity endpoint unreachable, retrying cached profile");
                match usable(cache.get_cached_profile().await) {
                    Some(cached) => RoleResolution::resolved(cached.profile.roles().clone()),
                    None => {
                        info!(
                            token = %token.fingerprint(),
                            "no cached profile to fall back on, signing out"
                        );
                        clear_session(cache).await;
                        RoleResolution::signed_out()
                    }
                }
            }
        };

        ResolutionOutcome::Resolved(resolution)
    }

    async fn lookup(&self, token: &SessionToken) -> Result<Value, IdentityLookupError> {
        let timeout = self.config.lookup_timeout;
        tokio::time::timeout(timeout, self.identity_client.fetch_identity(token))
            .await
            .unwrap_or(Err(IdentityLookupError::TimedOut(timeout)))
    }
}

async fn accept_identity(
    cache: &SessionCache,
    token: &SessionToken,
    payload: &Value,
) -> RoleResolution {
    let parsed = UserProfile::from_identity_payload(payload);
    if !parsed.unrecognized_roles.is_empty() {
        warn!(
            dropped = ?parsed.unrecognized_roles,
            "identity payload carried unknown role tags"
        );
    }

    if let Err(error) = cache.set_cached_profile(&parsed.profile).await {
        warn!(%error, "failed to write profile snapshot");
    }

    debug!(
        token = %token.fingerprint(),
        roles = ?parsed.profile.roles().to_transport(),
        "roles resolved from identity endpoint"
    );
    RoleResolution::resolved(parsed.profile.roles().clone())
}

fn usable(cached: Option<CachedProfile>) -> Option<CachedProfile> {
    cached.filter(|cached| !cached.profile.roles().is_empty())
}

async fn clear_session(cache: &SessionCache) {
    if let Err(error) = cache.clear().await {
        warn!(%error, "failed to clear session");
    }
}
