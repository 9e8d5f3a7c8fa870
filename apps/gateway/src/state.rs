use agrogate_application::{NavigationService, SessionService};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub navigation_service: NavigationService,
    pub session_service: SessionService,
    pub frontend_url: String,
    pub redis_client: Option<redis::Client>,
}
