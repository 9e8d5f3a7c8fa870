use agrogate_application::{LoginOutcome, NavigationDecision, SessionOverview};
use agrogate_domain::{GuardState, RoleSet, RouteGuardResult, RouteMatch};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Health response payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/gateway-types/src/generated/health-response.ts"
)]
pub struct HealthResponse {
    pub status: &'static str,
    pub ready: bool,
    pub sessions: HealthDependencyStatus,
}

/// One runtime dependency health status.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/gateway-types/src/generated/health-dependency-status.ts"
)]
pub struct HealthDependencyStatus {
    pub status: &'static str,
    pub detail: Option<String>,
}

/// Incoming payload for username/password login.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/gateway-types/src/generated/login-request.ts"
)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login result with the landing path for the signed-in roles.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/gateway-types/src/generated/login-response.ts"
)]
pub struct LoginResponse {
    pub roles: Vec<String>,
    /// Dashboard path, absent until roles are known.
    pub home: Option<String>,
}

impl From<LoginOutcome> for LoginResponse {
    fn from(value: LoginOutcome) -> Self {
        Self {
            roles: value
                .profile
                .map(|profile| profile.roles().to_transport())
                .unwrap_or_default(),
            home: value.home.map(|portal| portal.dashboard_path()),
        }
    }
}

/// Resolved roles of the current browser session.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/gateway-types/src/generated/session-response.ts"
)]
pub struct SessionResponse {
    pub authenticated: bool,
    pub roles: Vec<String>,
    pub home: Option<String>,
}

impl From<SessionOverview> for SessionResponse {
    fn from(value: SessionOverview) -> Self {
        let roles = value.resolution.roles.as_ref();
        Self {
            authenticated: roles.is_some(),
            roles: roles.map(RoleSet::to_transport).unwrap_or_default(),
            home: value.home.map(|portal| portal.dashboard_path()),
        }
    }
}

/// Query for the navigation decision endpoint.
#[derive(Debug, Deserialize)]
pub struct NavigationQuery {
    pub path: String,
}

/// Navigation decision for one path.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/gateway-types/src/generated/navigation-response.ts"
)]
pub struct NavigationResponse {
    pub path: String,
    /// One of `login`, `root`, `page`, `not_found`.
    pub route: &'static str,
    pub portal: Option<String>,
    pub layout: Option<String>,
    pub page: Option<String>,
    pub guard: Option<String>,
    pub state: &'static str,
    /// One of `render`, `redirect_to_login`, `redirect_to_portal`, `loading`.
    pub result: &'static str,
    pub redirect_to: Option<String>,
}

impl From<NavigationDecision> for NavigationResponse {
    fn from(value: NavigationDecision) -> Self {
        let (route, portal, page) = match &value.route {
            RouteMatch::Login => ("login", None, None),
            RouteMatch::Root => ("root", None, None),
            RouteMatch::Page { portal, page } => ("page", Some(*portal), Some(page.clone())),
            RouteMatch::NotFound => ("not_found", None, None),
        };

        Self {
            route,
            portal: portal.map(|portal| portal.as_str().to_owned()),
            layout: portal.map(|portal| portal.layout().to_owned()),
            page,
            guard: value.guard,
            state: guard_state_name(&value.state),
            result: guard_result_name(&value.result),
            redirect_to: value.result.redirect_target().map(str::to_owned),
            path: value.path,
        }
    }
}

fn guard_state_name(state: &GuardState) -> &'static str {
    match state {
        GuardState::Unresolved => "unresolved",
        GuardState::Loading => "loading",
        GuardState::Authorized => "authorized",
        GuardState::Diverted { .. } => "diverted",
        GuardState::UnauthorizedNoToken => "unauthorized_no_token",
        GuardState::UnauthorizedRoleMismatch { .. } => "unauthorized_role_mismatch",
        GuardState::UnauthorizedEmptyRoles => "unauthorized_empty_roles",
    }
}

fn guard_result_name(result: &RouteGuardResult) -> &'static str {
    match result {
        RouteGuardResult::Render => "render",
        RouteGuardResult::RedirectToLogin => "redirect_to_login",
        RouteGuardResult::RedirectToPortal(_) => "redirect_to_portal",
        RouteGuardResult::Loading => "loading",
    }
}
