use std::fmt::{Debug, Formatter};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use agrogate_core::{AppResult, SessionToken};

/// Failure classes of an identity lookup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityLookupError {
    /// The endpoint rejected the credential (401 or 403).
    #[error("identity endpoint rejected the credential with status {0}")]
    Rejected(u16),

    /// Any other non-success status.
    #[error("identity endpoint returned status {0}")]
    Status(u16),

    /// The request never produced a response.
    #[error("identity endpoint unreachable: {0}")]
    Transport(String),

    /// No response within the configured bound.
    #[error("identity lookup timed out after {0:?}")]
    TimedOut(Duration),
}

impl IdentityLookupError {
    /// Classifies a non-success HTTP status.
    #[must_use]
    pub fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => Self::Rejected(status),
            other => Self::Status(other),
        }
    }
}

/// Credentials submitted to the login endpoint.
#[derive(Clone)]
pub struct LoginCredentials {
    /// Username or email.
    pub username: String,
    /// Plain-text password, forwarded as is.
    pub password: String,
}

impl Debug for LoginCredentials {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("LoginCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Successful login response.
#[derive(Debug, Clone)]
pub struct LoginGrant {
    /// Issued session token.
    pub token: SessionToken,
    /// Optional user snapshot returned alongside the token.
    pub user: Option<Value>,
}

/// Port for the backend identity and login endpoints.
#[async_trait]
pub trait IdentityClient: Send + Sync {
    /// Fetches the identity payload for a token.
    async fn fetch_identity(&self, token: &SessionToken) -> Result<Value, IdentityLookupError>;

    /// Exchanges credentials for a token.
    async fn login(&self, credentials: &LoginCredentials) -> AppResult<LoginGrant>;
}
