use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::AUTHORIZATION;
use serde_json::{Value, json};
use tracing::{debug, warn};
use url::Url;

use agrogate_application::{IdentityClient, IdentityLookupError, LoginCredentials, LoginGrant};
use agrogate_core::{AppError, AppResult, SessionToken};

const IDENTITY_PATH: &str = "auth/me/";
const LOGIN_PATH: &str = "auth/login/";
const TOKEN_FIELDS: [&str; 3] = ["token", "access", "key"];

/// reqwest-backed client for the backend identity and login endpoints.
#[derive(Clone)]
pub struct HttpIdentityClient {
    http_client: reqwest::Client,
    identity_url: Url,
    login_url: Url,
    auth_scheme: String,
    timeout: Duration,
}

impl HttpIdentityClient {
    /// Creates a client rooted at the backend API base URL.
    pub fn new(
        base_url: &Url,
        auth_scheme: impl Into<String>,
        timeout: Duration,
    ) -> AppResult<Self> {
        let base_url = with_trailing_slash(base_url);
        let identity_url = join(&base_url, IDENTITY_PATH)?;
        let login_url = join(&base_url, LOGIN_PATH)?;

        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| {
                AppError::Internal(format!("failed to build identity http client: {error}"))
            })?;

        Ok(Self {
            http_client,
            identity_url,
            login_url,
            auth_scheme: auth_scheme.into(),
            timeout,
        })
    }

    /// Returns the identity endpoint URL.
    #[must_use]
    pub fn identity_url(&self) -> &Url {
        &self.identity_url
    }

    fn classify_transport_error(&self, error: &reqwest::Error) -> IdentityLookupError {
        if error.is_timeout() {
            IdentityLookupError::TimedOut(self.timeout)
        } else {
            IdentityLookupError::Transport(error.to_string())
        }
    }
}

#[async_trait]
impl IdentityClient for HttpIdentityClient {
    async fn fetch_identity(&self, token: &SessionToken) -> Result<Value, IdentityLookupError> {
        let response = self
            .http_client
            .get(self.identity_url.clone())
            .header(
                AUTHORIZATION,
                format!("{} {}", self.auth_scheme, token.expose()),
            )
            .send()
            .await
            .map_err(|error| self.classify_transport_error(&error))?;

        let status = response.status();
        if !status.is_success() {
            debug!(
                status = status.as_u16(),
                token = %token.fingerprint(),
                "identity lookup refused"
            );
            return Err(IdentityLookupError::from_status(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|error| self.classify_transport_error(&error))?;

        // A success response that is not JSON carries no roles.
        Ok(serde_json::from_slice(&body).unwrap_or_else(|error| {
            warn!(%error, "identity endpoint returned a non-JSON body");
            Value::Null
        }))
    }

    async fn login(&self, credentials: &LoginCredentials) -> AppResult<LoginGrant> {
        let response = self
            .http_client
            .post(self.login_url.clone())
            .json(&json!({
                "username": credentials.username,
                "password": credentials.password,
            }))
            .send()
            .await
            .map_err(|error| {
                AppError::Unavailable(format!("login endpoint unreachable: {error}"))
            })?;

        let status = response.status();
        match status {
            status if status.is_success() => {}
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(AppError::Unauthorized("invalid credentials".to_owned()));
            }
            status => {
                return Err(AppError::Unavailable(format!(
                    "login endpoint returned status {status}"
                )));
            }
        }

        let body = response.json::<Value>().await.map_err(|error| {
            AppError::Internal(format!("login endpoint returned an invalid body: {error}"))
        })?;

        grant_from_body(&body)
    }
}

fn grant_from_body(body: &Value) -> AppResult<LoginGrant> {
    let raw_token = TOKEN_FIELDS
        .iter()
        .find_map(|field| body.get(field).and_then(Value::as_str))
        .ok_or_else(|| AppError::Internal("login response did not include a token".to_owned()))?;

    let token = SessionToken::new(raw_token)?;
    let user = body.get("user").filter(|user| user.is_object()).cloned();

    Ok(LoginGrant { token, user })
}

fn with_trailing_slash(url: &Url) -> Url {
    let mut url = url.clone();
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn join(base_url: &Url, path: &str) -> AppResult<Url> {
    base_url.join(path).map_err(|error| {
        AppError::Validation(format!("invalid identity endpoint path '{path}': {error}"))
    })
}
