//! Static portal route table.

use serde::{Deserialize, Serialize};

use crate::{GuardPolicy, LOGIN_PATH, Portal};

/// One portal mounted in the route table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalRoute {
    /// Portal served under the prefix.
    pub portal: Portal,
    /// Guard wrapping every page of the portal.
    pub guard: GuardPolicy,
}

/// Result of matching a request path against the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "route", rename_all = "snake_case")]
pub enum RouteMatch {
    /// The login page; never guarded.
    Login,
    /// `/`, resolved through the root redirect.
    Root,
    /// A page inside a guarded portal.
    Page {
        /// Owning portal.
        portal: Portal,
        /// Page component slug.
        page: String,
    },
    /// Nothing matched.
    NotFound,
}

/// Table mapping URL prefixes to guard, layout and pages.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<PortalRoute>,
}

impl RouteTable {
    /// Builds the table for every portal with its standard guard.
    #[must_use]
    pub fn standard() -> Self {
        let routes = Portal::all()
            .iter()
            .map(|portal| PortalRoute {
                portal: *portal,
                guard: standard_guard(*portal),
            })
            .collect();

        Self { routes }
    }

    /// Returns the route mounted for a portal.
    #[must_use]
    pub fn route(&self, portal: Portal) -> Option<&PortalRoute> {
        self.routes.iter().find(|route| route.portal == portal)
    }

    /// Matches a request path.
    ///
    /// Query strings and trailing slashes are ignored, a bare portal prefix maps to
    /// its landing page, and segments after the page slug (record ids) are allowed.
    #[must_use]
    pub fn match_path(&self, path: &str) -> RouteMatch {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');

        if trimmed.is_empty() {
            return RouteMatch::Root;
        }
        if trimmed == LOGIN_PATH {
            return RouteMatch::Login;
        }

        let mut segments = trimmed.trim_start_matches('/').split('/');
        let head = segments.next().unwrap_or_default();

        let prefixed = self
            .routes
            .iter()
            .find(|route| route.portal.prefix().trim_start_matches('/') == head);
        if let Some(route) = prefixed {
            let page = segments.next().unwrap_or("dashboard");
            return page_match(route.portal, page);
        }

        page_match(Portal::EndUser, head)
    }
}

fn page_match(portal: Portal, page: &str) -> RouteMatch {
    if portal.pages().contains(&page) {
        RouteMatch::Page {
            portal,
            page: page.to_owned(),
        }
    } else {
        RouteMatch::NotFound
    }
}

fn standard_guard(portal: Portal) -> GuardPolicy {
    match portal {
        Portal::SuperAdmin => GuardPolicy::super_admin(),
        Portal::Admin => GuardPolicy::admin(),
        Portal::Agronomist => GuardPolicy::agronomist(),
        Portal::Analyst => GuardPolicy::analyst(),
        Portal::Business => GuardPolicy::business(),
        Portal::Developer => GuardPolicy::developer(),
        Portal::Support => GuardPolicy::support(),
        Portal::EndUser => GuardPolicy::end_user(),
    }
}
