use tower_sessions::cookie::SameSite;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer, SessionStore};

use crate::redis_session_store::RedisSessionStore;

const SESSION_KEY_PREFIX: &str = "agrogate:session";

pub fn build_memory_session_layer(cookie_secure: bool) -> SessionManagerLayer<MemoryStore> {
    with_cookie_policy(MemoryStore::default(), cookie_secure)
}

pub fn build_redis_session_layer(
    redis_client: redis::Client,
    cookie_secure: bool,
) -> SessionManagerLayer<RedisSessionStore> {
    let session_store = RedisSessionStore::new(redis_client, SESSION_KEY_PREFIX);
    with_cookie_policy(session_store, cookie_secure)
}

fn with_cookie_policy<S>(session_store: S, cookie_secure: bool) -> SessionManagerLayer<S>
where
    S: SessionStore,
{
    SessionManagerLayer::new(session_store)
        .with_secure(cookie_secure)
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        // No idle timeout: a session ends only when it is cleared explicitly.
        .with_expiry(Expiry::OnSessionEnd)
}
