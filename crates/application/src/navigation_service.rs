//! Portal router: matches a path, runs its guard, and applies guard side effects.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use agrogate_domain::{
    GuardState, Portal, RoleResolution, RoleSet, RouteGuardResult, RouteMatch, RouteTable,
    evaluate_root, home_portal,
};

use crate::{MountTicket, MountTracker, ResolutionOutcome, RoleResolver, SessionCache};

const ROOT_GUARD: &str = "root";

/// Final navigation decision for one path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationDecision {
    /// Requested path.
    pub path: String,
    /// Route the path matched.
    pub route: RouteMatch,
    /// Guard that decided, if the route is guarded.
    pub guard: Option<String>,
    /// Guard state at decision time.
    pub state: GuardState,
    /// Render decision.
    pub result: RouteGuardResult,
}

/// Guarded route mount moving through the guard state machine.
#[derive(Debug, Clone)]
pub struct RouteMount {
    path: String,
    route: RouteMatch,
    ticket: MountTicket,
    token_present: bool,
    state: GuardState,
}

impl RouteMount {
    /// Returns the matched route.
    #[must_use]
    pub fn route(&self) -> &RouteMatch {
        &self.route
    }

    /// Returns the current guard state.
    #[must_use]
    pub fn state(&self) -> &GuardState {
        &self.state
    }

    /// Returns the ticket identifying this mount.
    #[must_use]
    pub fn ticket(&self) -> &MountTicket {
        &self.ticket
    }
}

/// Snapshot of the current session for the UI shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOverview {
    /// Role resolution for the session.
    pub resolution: RoleResolution,
    /// Landing portal, when the session holds at least one role.
    pub home: Option<Portal>,
}

/// Application service deciding render vs redirect for request paths.
#[derive(Clone)]
pub struct NavigationService {
    resolver: RoleResolver,
    routes: Arc<RouteTable>,
}

impl NavigationService {
    /// Creates a navigation service.
    #[must_use]
    pub fn new(resolver: RoleResolver, routes: RouteTable) -> Self {
        Self {
            resolver,
            routes: Arc::new(routes),
        }
    }

    /// Mounts a path: unguarded and token-less routes settle immediately, guarded
    /// routes with a token enter `Loading`.
    pub async fn begin_mount(
        &self,
        path: &str,
        cache: &SessionCache,
        tracker: &MountTracker,
    ) -> RouteMount {
        let route = self.routes.match_path(path);
        let ticket = tracker.mount();
        let token_present = cache.get_token().await.is_some();

        let state = match route {
            RouteMatch::Login | RouteMatch::NotFound => GuardState::Authorized,
            RouteMatch::Root | RouteMatch::Page { .. } if !token_present => {
                GuardState::UnauthorizedNoToken
            }
            RouteMatch::Root | RouteMatch::Page { .. } => GuardState::Loading,
        };

        RouteMount {
            path: path.to_owned(),
            route,
            ticket,
            token_present,
            state,
        }
    }

    /// Resolves roles for a loading mount and applies the guard.
    ///
    /// Returns `false` when the mount was superseded; its state stays `Loading`.
    pub async fn complete_mount(&self, mount: &mut RouteMount, cache: &SessionCache) -> bool {
        if mount.state.is_terminal() {
            return true;
        }

        let resolution = match self.resolver.resolve_for_mount(cache, &mount.ticket).await {
            ResolutionOutcome::Resolved(resolution) => resolution,
            ResolutionOutcome::Superseded => return false,
        };

        mount.state = self.evaluate(&mount.route, mount.token_present, &resolution);
        if mount.state.clears_session() {
            info!(path = %mount.path, "session has no assigned role, signing out");
            self.clear_session(cache).await;
        }

        true
    }

    /// Mounts a path and runs it to a terminal decision.
    pub async fn navigate(&self, path: &str, cache: &SessionCache) -> NavigationDecision {
        let tracker = MountTracker::new();
        let mut mount = self.begin_mount(path, cache, &tracker).await;
        self.complete_mount(&mut mount, cache).await;

        let decision = self.decision(&mount);
        debug!(
            path,
            guard = decision.guard.as_deref().unwrap_or("none"),
            result = ?decision.result,
            "navigation decided"
        );
        decision
    }

    /// Builds the decision for a mount in its current state.
    #[must_use]
    pub fn decision(&self, mount: &RouteMount) -> NavigationDecision {
        NavigationDecision {
            path: mount.path.clone(),
            route: mount.route.clone(),
            guard: self.guard_name(&mount.route),
            state: mount.state.clone(),
            result: mount.state.decision(),
        }
    }

    /// Resolves the session's roles and landing portal.
    ///
    /// A session whose roles resolve empty is cleared and reported signed out.
    pub async fn overview(&self, cache: &SessionCache) -> SessionOverview {
        let mut resolution = self.resolver.resolve(cache).await;
        if resolution.roles.as_ref().is_some_and(RoleSet::is_empty) {
            info!("session has no assigned role, signing out");
            self.clear_session(cache).await;
            resolution = RoleResolution::signed_out();
        }

        let home = resolution.roles.as_ref().and_then(home_portal);

        SessionOverview { resolution, home }
    }

    async fn clear_session(&self, cache: &SessionCache) {
        if let Err(error) = cache.clear().await {
            warn!(%error, "failed to clear session");
        }
    }

    fn evaluate(
        &self,
        route: &RouteMatch,
        token_present: bool,
        resolution: &RoleResolution,
    ) -> GuardState {
        match route {
            RouteMatch::Root => evaluate_root(token_present, resolution),
            RouteMatch::Page { portal, .. } => match self.routes.route(*portal) {
                Some(portal_route) => portal_route.guard.evaluate(token_present, resolution),
                None => GuardState::UnauthorizedNoToken,
            },
            RouteMatch::Login | RouteMatch::NotFound => GuardState::Authorized,
        }
    }

    fn guard_name(&self, route: &RouteMatch) -> Option<String> {
        match route {
            RouteMatch::Root => Some(ROOT_GUARD.to_owned()),
            RouteMatch::Page { portal, .. } => self
                .routes
                .route(*portal)
                .map(|portal_route| portal_route.guard.name().to_owned()),
            RouteMatch::Login | RouteMatch::NotFound => None,
        }
    }
}
