//! Agrogate gateway composition root.

#![forbid(unsafe_code)]

mod auth;
mod browser_session;
mod dto;
mod error;
mod gateway_config;
mod gateway_router;
mod gateway_services;
mod handlers;
mod middleware;
mod redis_session_store;
mod state;

use agrogate_core::AppError;
use tracing::info;

use crate::gateway_config::{GatewayConfig, SessionBackendConfig, init_tracing};
use crate::gateway_router::build_router;
use crate::gateway_services::redis::build_redis_client;
use crate::gateway_services::sessions::{build_memory_session_layer, build_redis_session_layer};
use crate::gateway_services::state_builder::{build_app_state, build_identity_client};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = GatewayConfig::load()?;
    let identity_client = build_identity_client(&config)?;

    let app = match &config.session_backend {
        SessionBackendConfig::Memory => {
            let app_state = build_app_state(&config, identity_client, None);
            build_router(
                app_state,
                &config.frontend_url,
                build_memory_session_layer(config.cookie_secure),
            )?
        }
        SessionBackendConfig::Redis { redis_url } => {
            let redis_client = build_redis_client(redis_url)?;
            let app_state = build_app_state(&config, identity_client, Some(redis_client.clone()));
            build_router(
                app_state,
                &config.frontend_url,
                build_redis_session_layer(redis_client, config.cookie_secure),
            )?
        }
    };

    let address = config.socket_address()?;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(
        %address,
        identity_api = %config.identity_api_base_url,
        "agrogate-gateway listening"
    );

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("gateway server error: {error}")))
}
