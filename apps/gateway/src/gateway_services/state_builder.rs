use std::sync::Arc;

use agrogate_application::{IdentityClient, NavigationService, RoleResolver, SessionService};
use agrogate_core::AppError;
use agrogate_domain::RouteTable;
use agrogate_infrastructure::HttpIdentityClient;

use crate::gateway_config::GatewayConfig;
use crate::state::AppState;

pub fn build_identity_client(config: &GatewayConfig) -> Result<Arc<dyn IdentityClient>, AppError> {
    let client = HttpIdentityClient::new(
        &config.identity_api_base_url,
        config.identity_auth_scheme.clone(),
        config.identity_lookup_timeout,
    )?;

    Ok(Arc::new(client))
}

pub fn build_app_state(
    config: &GatewayConfig,
    identity_client: Arc<dyn IdentityClient>,
    redis_client: Option<redis::Client>,
) -> AppState {
    let resolver = RoleResolver::new(identity_client.clone(), config.resolver_config());

    AppState {
        navigation_service: NavigationService::new(resolver, RouteTable::standard()),
        session_service: SessionService::new(identity_client),
        frontend_url: config.frontend_url.clone(),
        redis_client,
    }
}
