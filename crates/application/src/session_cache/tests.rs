use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeDelta, Utc};

use agrogate_domain::{RoleName, RoleSet, UserProfile};

use crate::test_support::{FakeSessionStore, cache_with_store, token};

use super::{CachedProfile, PROFILE_KEY, SessionCache, TOKEN_KEY};

fn profile(roles: &[RoleName]) -> UserProfile {
    UserProfile::new(
        "11",
        "Wanjiru Kamau",
        Some("wanjiru@example.com".to_owned()),
        roles.iter().copied().collect::<RoleSet>(),
    )
}

#[tokio::test]
async fn token_writes_are_visible_immediately() {
    let (cache, store) = cache_with_store();

    assert!(cache.get_token().await.is_none());

    let result = cache.set_token(&token("tok-1")).await;
    assert!(result.is_ok());
    assert_eq!(cache.get_token().await, Some(token("tok-1")));
    assert_eq!(store.raw(TOKEN_KEY).await.as_deref(), Some("tok-1"));

    let result = cache.clear_token().await;
    assert!(result.is_ok());
    assert!(cache.get_token().await.is_none());
}

#[tokio::test]
async fn cached_profile_roundtrip_preserves_roles() {
    let (cache, _store) = cache_with_store();
    let original = profile(&[RoleName::Support, RoleName::Analyst]);

    let result = cache.set_cached_profile(&original).await;
    assert!(result.is_ok());

    let cached = cache.get_cached_profile().await;
    assert_eq!(
        cached.map(|cached| cached.profile.roles().clone()),
        Some(original.roles().clone())
    );
}

#[tokio::test]
async fn malformed_profile_json_is_a_cache_miss() {
    let (cache, store) = cache_with_store();
    store.put_raw(PROFILE_KEY, "{not json").await;

    assert!(cache.get_cached_profile().await.is_none());
}

#[tokio::test]
async fn profile_with_unknown_role_tag_is_a_cache_miss() {
    let (cache, store) = cache_with_store();
    store
        .put_raw(
            PROFILE_KEY,
            r#"{"profile":{"id":"1","full_name":"x","email":null,"roles":["Farmhand"]},"cached_at":"2026-01-01T00:00:00Z"}"#,
        )
        .await;

    assert!(cache.get_cached_profile().await.is_none());
}

#[tokio::test]
async fn blank_stored_token_reads_as_absent() {
    let (cache, store) = cache_with_store();
    store.put_raw(TOKEN_KEY, "   ").await;

    assert!(cache.get_token().await.is_none());
}

#[tokio::test]
async fn storage_read_failures_fail_soft() {
    let cache = SessionCache::new(Arc::new(FakeSessionStore::failing_reads()));

    assert!(cache.get_token().await.is_none());
    assert!(cache.get_cached_profile().await.is_none());
}

#[tokio::test]
async fn clear_removes_token_and_profile() {
    let (cache, store) = cache_with_store();
    let _ = cache.set_token(&token("tok-2")).await;
    let _ = cache.set_cached_profile(&profile(&[RoleName::Admin])).await;

    let result = cache.clear().await;

    assert!(result.is_ok());
    assert!(store.raw(TOKEN_KEY).await.is_none());
    assert!(store.raw(PROFILE_KEY).await.is_none());
}

#[test]
fn freshness_respects_revalidation_window() {
    let now = Utc::now();
    let cached = CachedProfile {
        profile: profile(&[RoleName::Admin]),
        cached_at: now - TimeDelta::seconds(120),
    };

    assert!(cached.is_fresh(Some(Duration::from_secs(300)), now));
    assert!(!cached.is_fresh(Some(Duration::from_secs(60)), now));
    assert!(cached.is_fresh(None, now));
}
