use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use agrogate_core::{AppError, AppResult, SessionToken};

use crate::{
    IdentityClient, IdentityLookupError, LoginCredentials, LoginGrant, SessionCache, SessionStore,
};

#[derive(Default)]
pub(crate) struct FakeSessionStore {
    items: Mutex<HashMap<String, String>>,
    fail_reads: bool,
}

impl FakeSessionStore {
    pub(crate) fn failing_reads() -> Self {
        Self {
            items: Mutex::new(HashMap::new()),
            fail_reads: true,
        }
    }

    pub(crate) async fn raw(&self, key: &str) -> Option<String> {
        self.items.lock().await.get(key).cloned()
    }

    pub(crate) async fn put_raw(&self, key: &str, value: &str) {
        self.items
            .lock()
            .await
            .insert(key.to_owned(), value.to_owned());
    }
}

#[async_trait]
impl SessionStore for FakeSessionStore {
    async fn get_item(&self, key: &str) -> AppResult<Option<String>> {
        if self.fail_reads {
            return Err(AppError::Unavailable("session backend offline".to_owned()));
        }

        Ok(self.items.lock().await.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: String) -> AppResult<()> {
        self.items.lock().await.insert(key.to_owned(), value);
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> AppResult<()> {
        self.items.lock().await.remove(key);
        Ok(())
    }
}

pub(crate) fn cache_with_store() -> (SessionCache, Arc<FakeSessionStore>) {
    let store = Arc::new(FakeSessionStore::default());
    (SessionCache::new(store.clone()), store)
}

pub(crate) fn token(value: &str) -> SessionToken {
    SessionToken::new(value).unwrap_or_else(|_| unreachable!("test tokens are non-empty"))
}

/// Scripted identity endpoint; every call pops the next scripted response.
#[derive(Default)]
pub(crate) struct FakeIdentityClient {
    lookups: Mutex<VecDeque<Result<Value, IdentityLookupError>>>,
    lookup_calls: AtomicUsize,
    lookup_delay: Option<Duration>,
    login_response: Mutex<Option<AppResult<LoginGrant>>>,
}

impl FakeIdentityClient {
    pub(crate) fn with_lookups(lookups: Vec<Result<Value, IdentityLookupError>>) -> Self {
        Self {
            lookups: Mutex::new(lookups.into()),
            ..Self::default()
        }
    }

    pub(crate) fn delayed(mut self, delay: Duration) -> Self {
        self.lookup_delay = Some(delay);
        self
    }

    pub(crate) fn with_login(self, response: AppResult<LoginGrant>) -> Self {
        Self {
            login_response: Mutex::new(Some(response)),
            ..self
        }
    }

    pub(crate) fn lookup_calls(&self) -> usize {
        self.lookup_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityClient for FakeIdentityClient {
    async fn fetch_identity(&self, _token: &SessionToken) -> Result<Value, IdentityLookupError> {
        self.lookup_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.lookup_delay {
            tokio::time::sleep(delay).await;
        }

        self.lookups
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Err(IdentityLookupError::Transport("no scripted response".to_owned())))
    }

    async fn login(&self, _credentials: &LoginCredentials) -> AppResult<LoginGrant> {
        self.login_response
            .lock()
            .await
            .take()
            .unwrap_or_else(|| Err(AppError::Unauthorized("invalid credentials".to_owned())))
    }
}
