//! Application services and ports.

#![forbid(unsafe_code)]

mod identity_ports;
mod mount;
mod navigation_service;
mod role_resolver;
mod session_cache;
mod session_service;

#[cfg(test)]
mod test_support;

pub use identity_ports::{IdentityClient, IdentityLookupError, LoginCredentials, LoginGrant};
pub use mount::{MountTicket, MountTracker};
pub use navigation_service::{NavigationDecision, NavigationService, RouteMount, SessionOverview};
pub use role_resolver::{ResolutionOutcome, ResolverConfig, RoleResolver};
pub use session_cache::{CachedProfile, PROFILE_KEY, SessionCache, SessionStore, TOKEN_KEY};
pub use session_service::{LoginOutcome, SessionService};
