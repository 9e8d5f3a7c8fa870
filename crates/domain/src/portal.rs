use serde::{Deserialize, Serialize};

use crate::{RoleName, RoleSet};

/// Path of the login page.
pub const LOGIN_PATH: &str = "/login";

/// Role workspaces reachable from the root redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Portal {
    /// Platform owner workspace.
    SuperAdmin,
    /// Operational administration workspace.
    Admin,
    /// Agronomist advisory workspace.
    Agronomist,
    /// Analyst reporting workspace.
    Analyst,
    /// Business operations workspace.
    Business,
    /// Developer integrations workspace.
    Developer,
    /// Support desk workspace.
    Support,
    /// Farmer-facing workspace mounted at the top level.
    EndUser,
}

/// Root redirect precedence; first held role wins.
///
/// Elevated operational roles outrank the generic Admin, and everyone without a
/// listed role lands on the end-user dashboard.
pub const ROOT_PRECEDENCE: &[(RoleName, Portal)] = &[
    (RoleName::SuperAdmin, Portal::SuperAdmin),
    (RoleName::Agronomist, Portal::Agronomist),
    (RoleName::Analyst, Portal::Analyst),
    (RoleName::Business, Portal::Business),
    (RoleName::Developer, Portal::Developer),
    (RoleName::Support, Portal::Support),
    (RoleName::Admin, Portal::Admin),
];

impl Portal {
    /// Returns a stable identifier.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SuperAdmin => "superadmin",
            Self::Admin => "admin",
            Self::Agronomist => "agronomist",
            Self::Analyst => "analyst",
            Self::Business => "business",
            Self::Developer => "developer",
            Self::Support => "support",
            Self::EndUser => "end_user",
        }
    }

    /// Returns all portals.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Portal] = &[
            Portal::SuperAdmin,
            Portal::Admin,
            Portal::Agronomist,
            Portal::Analyst,
            Portal::Business,
            Portal::Developer,
            Portal::Support,
            Portal::EndUser,
        ];

        ALL
    }

    /// Returns the URL prefix; the end-user portal lives at the top level.
    #[must_use]
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::SuperAdmin => "/superadmin",
            Self::Admin => "/admin",
            Self::Agronomist => "/agronomist",
            Self::Analyst => "/analyst",
            Self::Business => "/business",
            Self::Developer => "/developer",
            Self::Support => "/support",
            Self::EndUser => "",
        }
    }

    /// Returns the landing page path.
    #[must_use]
    pub fn dashboard_path(&self) -> String {
        format!("{}/dashboard", self.prefix())
    }

    /// Returns the layout component that frames the portal's pages.
    #[must_use]
    pub fn layout(&self) -> &'static str {
        match self {
            Self::SuperAdmin => "SuperAdminLayout",
            Self::Admin => "AdminLayout",
            Self::Agronomist => "AgronomistLayout",
            Self::Analyst => "AnalystLayout",
            Self::Business => "BusinessLayout",
            Self::Developer => "DeveloperLayout",
            Self::Support => "SupportLayout",
            Self::EndUser => "UserLayout",
        }
    }

    /// Returns the portal's own pages; the first one is the landing page.
    #[must_use]
    pub fn pages(&self) -> &'static [&'static str] {
        match self {
            Self::SuperAdmin => &[
                "dashboard",
                "admins",
                "users",
                "roles",
                "audit",
                "system",
                "notifications",
            ],
            Self::Admin => &[
                "dashboard",
                "users",
                "farms",
                "reports",
                "payments",
                "notifications",
                "settings",
            ],
            Self::Agronomist => &[
                "dashboard",
                "farms",
                "advisories",
                "soil-tests",
                "crop-plans",
                "notifications",
            ],
            Self::Analyst => &[
                "dashboard",
                "reports",
                "yields",
                "market",
                "exports",
                "notifications",
            ],
            Self::Business => &[
                "dashboard",
                "orders",
                "customers",
                "invoices",
                "subscriptions",
                "notifications",
            ],
            Self::Developer => &[
                "dashboard",
                "api-keys",
                "webhooks",
                "logs",
                "integrations",
                "notifications",
            ],
            Self::Support => &[
                "dashboard",
                "tickets",
                "users",
                "knowledge-base",
                "notifications",
            ],
            Self::EndUser => &[
                "dashboard",
                "profile",
                "farms",
                "crops",
                "orders",
                "payments",
                "notifications",
                "settings",
            ],
        }
    }
}

/// Picks the landing portal for a role set by fixed precedence.
///
/// Returns `None` for an empty set, which callers treat as an invalid session.
#[must_use]
pub fn home_portal(roles: &RoleSet) -> Option<Portal> {
    if roles.is_empty() {
        return None;
    }

    let portal = ROOT_PRECEDENCE
        .iter()
        .find(|(role, _)| roles.contains(*role))
        .map_or(Portal::EndUser, |(_, portal)| *portal);

    Some(portal)
}
