use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use agrogate_application::ResolverConfig;
use agrogate_core::AppError;
use tracing_subscriber::EnvFilter;
use url::Url;

/// Backing store for browser sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionBackendConfig {
    Memory,
    Redis { redis_url: String },
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub identity_api_base_url: Url,
    pub identity_auth_scheme: String,
    pub identity_lookup_timeout: Duration,
    pub role_cache_revalidate_after: Option<Duration>,
    pub frontend_url: String,
    pub gateway_host: String,
    pub gateway_port: u16,
    pub session_backend: SessionBackendConfig,
    pub cookie_secure: bool,
}

impl GatewayConfig {
    pub fn load() -> Result<Self, AppError> {
        let identity_api_base_url = required_non_empty_env("IDENTITY_API_BASE_URL")?;
        let identity_api_base_url = Url::parse(&identity_api_base_url).map_err(|error| {
            AppError::Validation(format!("invalid IDENTITY_API_BASE_URL: {error}"))
        })?;
        let identity_auth_scheme =
            env::var("IDENTITY_AUTH_SCHEME").unwrap_or_else(|_| "Bearer".to_owned());

        let identity_lookup_timeout =
            Duration::from_millis(parse_env_or("IDENTITY_LOOKUP_TIMEOUT_MS", 5_000)?);
        if identity_lookup_timeout.is_zero() {
            return Err(AppError::Validation(
                "IDENTITY_LOOKUP_TIMEOUT_MS must be greater than zero".to_owned(),
            ));
        }

        // Zero keeps cached roles authoritative for the whole session.
        let revalidate_seconds = parse_env_or("ROLE_CACHE_REVALIDATE_SECONDS", 300)?;
        let role_cache_revalidate_after =
            (revalidate_seconds > 0).then(|| Duration::from_secs(revalidate_seconds));

        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());
        let gateway_host = env::var("GATEWAY_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let gateway_port = env::var("GATEWAY_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3001);

        let session_backend = match env::var("SESSION_STORE")
            .unwrap_or_else(|_| "memory".to_owned())
            .as_str()
        {
            "memory" => SessionBackendConfig::Memory,
            "redis" => SessionBackendConfig::Redis {
                redis_url: required_non_empty_env("REDIS_URL")?,
            },
            other => {
                return Err(AppError::Validation(format!(
                    "SESSION_STORE must be either 'memory' or 'redis', got '{other}'"
                )));
            }
        };

        let cookie_secure = env::var("SESSION_COOKIE_SECURE")
            .unwrap_or_else(|_| "false".to_owned())
            .eq_ignore_ascii_case("true");

        Ok(Self {
            identity_api_base_url,
            identity_auth_scheme,
            identity_lookup_timeout,
            role_cache_revalidate_after,
            frontend_url,
            gateway_host,
            gateway_port,
            session_backend,
            cookie_secure,
        })
    }

    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig::new(
            self.identity_lookup_timeout,
            self.role_cache_revalidate_after,
        )
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.gateway_host).map_err(|error| {
            AppError::Internal(format!(
                "invalid GATEWAY_HOST '{}': {error}",
                self.gateway_host
            ))
        })?;
        Ok(SocketAddr::from((host, self.gateway_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_env(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}

fn required_non_empty_env(name: &str) -> Result<String, AppError> {
    let value = required_env(name)?;
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }

    Ok(value)
}

fn parse_env_or(name: &str, default: u64) -> Result<u64, AppError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse::<u64>()
            .map_err(|error| AppError::Validation(format!("invalid {name}: {error}"))),
        _ => Ok(default),
    }
}
