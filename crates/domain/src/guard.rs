//! Route guard policies and their render/redirect decisions.
//!
//! Guards are pure: they look at whether a token is present and at the role
//! resolution reported for the current mount, and produce a [`GuardState`].
//! Side effects implied by a state (clearing the session) are applied by the
//! caller.

use serde::{Deserialize, Serialize};

use crate::{LOGIN_PATH, Portal, RoleName, RoleSet, home_portal};

/// Role resolution reported for one guard mount.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RoleResolution {
    /// Resolved roles; `None` means there is no valid session.
    pub roles: Option<RoleSet>,
    /// Whether resolution is still in flight.
    pub loading: bool,
}

impl RoleResolution {
    /// Resolution still in flight.
    #[must_use]
    pub fn loading() -> Self {
        Self {
            roles: None,
            loading: true,
        }
    }

    /// No valid session.
    #[must_use]
    pub fn signed_out() -> Self {
        Self::default()
    }

    /// Completed resolution.
    #[must_use]
    pub fn resolved(roles: RoleSet) -> Self {
        Self {
            roles: Some(roles),
            loading: false,
        }
    }
}

/// Static role predicate attached to a guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RolePredicate {
    /// Holds the role.
    Has(RoleName),
    /// Holds at least one of the roles.
    AnyOf(Vec<RoleName>),
    /// Holds `required` and does not hold `excluded`.
    HasWithout {
        /// Role that must be held.
        required: RoleName,
        /// Role that must not be held.
        excluded: RoleName,
    },
    /// Holds exactly one role and it is this one.
    Exactly(RoleName),
}

impl RolePredicate {
    /// Evaluates the predicate over a resolved role set.
    #[must_use]
    pub fn matches(&self, roles: &RoleSet) -> bool {
        match self {
            Self::Has(role) => roles.contains(*role),
            Self::AnyOf(allowed) => roles.contains_any(allowed),
            Self::HasWithout { required, excluded } => {
                roles.contains(*required) && !roles.contains(*excluded)
            }
            Self::Exactly(role) => roles.only() == Some(*role),
        }
    }
}

/// Where a guard sends users whose roles fail its predicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "path", rename_all = "snake_case")]
pub enum GuardFallback {
    /// The login page.
    Login,
    /// Any other path.
    Path(String),
}

impl GuardFallback {
    /// Builds a fallback from a caller-supplied path.
    #[must_use]
    pub fn from_path(path: impl Into<String>) -> Self {
        let path = path.into();
        if path == LOGIN_PATH {
            Self::Login
        } else {
            Self::Path(path)
        }
    }
}

/// Cross-portal redirect applied before the predicate.
///
/// Used for role conflicts, e.g. an admin opening the end-user portal is sent to
/// the admin dashboard instead of being logged out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Diversion {
    /// Role that triggers the diversion.
    pub role: RoleName,
    /// Portal the holder is sent to.
    pub target: Portal,
}

/// Guard attached to a route subtree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardPolicy {
    name: String,
    predicate: RolePredicate,
    diversions: Vec<Diversion>,
    fallback: GuardFallback,
}

impl GuardPolicy {
    /// Creates a guard with a login fallback and no diversions.
    #[must_use]
    pub fn new(name: impl Into<String>, predicate: RolePredicate) -> Self {
        Self {
            name: name.into(),
            predicate,
            diversions: Vec::new(),
            fallback: GuardFallback::Login,
        }
    }

    /// Adds a cross-portal diversion; diversions are checked in insertion order.
    #[must_use]
    pub fn divert(mut self, role: RoleName, target: Portal) -> Self {
        self.diversions.push(Diversion { role, target });
        self
    }

    /// Replaces the fallback.
    #[must_use]
    pub fn with_fallback(mut self, fallback: GuardFallback) -> Self {
        self.fallback = fallback;
        self
    }

    /// SuperAdmin-only guard.
    #[must_use]
    pub fn super_admin() -> Self {
        Self::new("super_admin", RolePredicate::Has(RoleName::SuperAdmin))
    }

    /// Admin guard; super admins are sent to their own portal.
    #[must_use]
    pub fn admin() -> Self {
        Self::new(
            "admin",
            RolePredicate::HasWithout {
                required: RoleName::Admin,
                excluded: RoleName::SuperAdmin,
            },
        )
        .divert(RoleName::SuperAdmin, Portal::SuperAdmin)
    }

    /// Agronomist guard.
    #[must_use]
    pub fn agronomist() -> Self {
        Self::new("agronomist", RolePredicate::Has(RoleName::Agronomist))
    }

    /// Analyst guard.
    #[must_use]
    pub fn analyst() -> Self {
        Self::new("analyst", RolePredicate::Has(RoleName::Analyst))
    }

    /// Business guard.
    #[must_use]
    pub fn business() -> Self {
        Self::new("business", RolePredicate::Has(RoleName::Business))
    }

    /// Developer guard.
    #[must_use]
    pub fn developer() -> Self {
        Self::new("developer", RolePredicate::Has(RoleName::Developer))
    }

    /// Support guard.
    #[must_use]
    pub fn support() -> Self {
        Self::new("support", RolePredicate::Has(RoleName::Support))
    }

    /// End-user guard; admins are redirected to their portal rather than logged out.
    #[must_use]
    pub fn end_user() -> Self {
        Self::new("end_user", RolePredicate::Has(RoleName::EndAppUser))
            .divert(RoleName::SuperAdmin, Portal::SuperAdmin)
            .divert(RoleName::Admin, Portal::Admin)
    }

    /// Generic guard admitting any of `allowed`.
    #[must_use]
    pub fn any_of(allowed: Vec<RoleName>, fallback_path: impl Into<String>) -> Self {
        Self::new("any_of", RolePredicate::AnyOf(allowed))
            .with_fallback(GuardFallback::from_path(fallback_path))
    }

    /// Returns the guard name used in logs and API payloads.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Evaluates the guard for one mount.
    #[must_use]
    pub fn evaluate(&self, token_present: bool, resolution: &RoleResolution) -> GuardState {
        let roles = match authenticated_roles(token_present, resolution) {
            Ok(roles) => roles,
            Err(state) => return state,
        };

        if let Some(diversion) = self
            .diversions
            .iter()
            .find(|diversion| roles.contains(diversion.role))
        {
            return GuardState::Diverted {
                target: diversion.target,
            };
        }

        if self.predicate.matches(roles) {
            GuardState::Authorized
        } else {
            GuardState::UnauthorizedRoleMismatch {
                fallback: self.fallback.clone(),
            }
        }
    }
}

/// Resolves `/` to the correct portal home.
#[must_use]
pub fn evaluate_root(token_present: bool, resolution: &RoleResolution) -> GuardState {
    let roles = match authenticated_roles(token_present, resolution) {
        Ok(roles) => roles,
        Err(state) => return state,
    };

    match home_portal(roles) {
        Some(target) => GuardState::Diverted { target },
        None => GuardState::UnauthorizedEmptyRoles,
    }
}

fn authenticated_roles(
    token_present: bool,
    resolution: &RoleResolution,
) -> Result<&RoleSet, GuardState> {
    if !token_present {
        return Err(GuardState::UnauthorizedNoToken);
    }
    if resolution.loading {
        return Err(GuardState::Loading);
    }

    match resolution.roles.as_ref() {
        None => Err(GuardState::UnauthorizedNoToken),
        Some(roles) if roles.is_empty() => Err(GuardState::UnauthorizedEmptyRoles),
        Some(roles) => Ok(roles),
    }
}

/// Lifecycle state of a guarded route mount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum GuardState {
    /// Mounted, resolution not started.
    Unresolved,
    /// Identity lookup in flight.
    Loading,
    /// Predicate satisfied.
    Authorized,
    /// Authenticated user sent to another portal (role conflict or root redirect).
    Diverted {
        /// Destination portal.
        target: Portal,
    },
    /// No session token.
    UnauthorizedNoToken,
    /// Roles resolved but the predicate failed.
    UnauthorizedRoleMismatch {
        /// Destination for the redirect.
        fallback: GuardFallback,
    },
    /// Authenticated with no assigned role; treated as an invalid session.
    UnauthorizedEmptyRoles,
}

impl GuardState {
    /// Maps the state to a render decision.
    #[must_use]
    pub fn decision(&self) -> RouteGuardResult {
        match self {
            Self::Unresolved | Self::Loading => RouteGuardResult::Loading,
            Self::Authorized => RouteGuardResult::Render,
            Self::Diverted { target } => {
                RouteGuardResult::RedirectToPortal(target.dashboard_path())
            }
            Self::UnauthorizedNoToken | Self::UnauthorizedEmptyRoles => {
                RouteGuardResult::RedirectToLogin
            }
            Self::UnauthorizedRoleMismatch { fallback } => match fallback {
                GuardFallback::Login => RouteGuardResult::RedirectToLogin,
                GuardFallback::Path(path) => RouteGuardResult::RedirectToPortal(path.clone()),
            },
        }
    }

    /// Whether reaching this state must clear the stored token and profile.
    #[must_use]
    pub fn clears_session(&self) -> bool {
        matches!(self, Self::UnauthorizedEmptyRoles)
    }

    /// Whether the state is final for the current mount.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Unresolved | Self::Loading)
    }
}

/// Render decision produced by a guard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "target", rename_all = "snake_case")]
pub enum RouteGuardResult {
    /// Render the wrapped subtree.
    Render,
    /// Send the user to the login page.
    RedirectToLogin,
    /// Send the user to another path.
    RedirectToPortal(String),
    /// Show the neutral loading placeholder.
    Loading,
}

impl RouteGuardResult {
    /// Returns the redirect destination, if any.
    #[must_use]
    pub fn redirect_target(&self) -> Option<&str> {
        match self {
            Self::RedirectToLogin => Some(LOGIN_PATH),
            Self::RedirectToPortal(target) => Some(target.as_str()),
            Self::Render | Self::Loading => None,
        }
    }
}
