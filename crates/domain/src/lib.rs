//! Domain types for role-gated portal navigation.

#![forbid(unsafe_code)]

mod guard;
mod portal;
mod profile;
mod role;
mod routes;

pub use guard::{
    Diversion, GuardFallback, GuardPolicy, GuardState, RolePredicate, RoleResolution,
    RouteGuardResult, evaluate_root,
};
pub use portal::{LOGIN_PATH, Portal, ROOT_PRECEDENCE, home_portal};
pub use profile::{ParsedProfile, UserProfile};
pub use role::{ParsedRoles, RoleName, RoleSet};
pub use routes::{PortalRoute, RouteMatch, RouteTable};
