use std::collections::BTreeSet;
use std::str::FromStr;

use agrogate_core::AppError;
use serde::{Deserialize, Serialize};

/// Permission tiers recognized by the portal router.
///
/// The set is closed: tags the identity endpoint sends that do not map onto one
/// of these variants are dropped during parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RoleName {
    /// Platform owner; manages admins and system settings.
    SuperAdmin,
    /// Operational administrator of farms and users.
    Admin,
    /// Field expert issuing crop and soil advisories.
    Agronomist,
    /// Works with yield, market and export reports.
    Analyst,
    /// Handles orders, invoices and subscriptions.
    Business,
    /// Manages API keys, webhooks and integrations.
    Developer,
    /// Answers tickets raised by end users.
    Support,
    /// Farmer-facing application user.
    #[serde(rename = "End-App-User")]
    EndAppUser,
}

impl RoleName {
    /// Returns the transport value used by the identity endpoint.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SuperAdmin => "SuperAdmin",
            Self::Admin => "Admin",
            Self::Agronomist => "Agronomist",
            Self::Analyst => "Analyst",
            Self::Business => "Business",
            Self::Developer => "Developer",
            Self::Support => "Support",
            Self::EndAppUser => "End-App-User",
        }
    }

    /// Returns all known roles.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[RoleName] = &[
            RoleName::SuperAdmin,
            RoleName::Admin,
            RoleName::Agronomist,
            RoleName::Analyst,
            RoleName::Business,
            RoleName::Developer,
            RoleName::Support,
            RoleName::EndAppUser,
        ];

        ALL
    }

    /// Parses a transport value into a role.
    pub fn from_transport(value: &str) -> Result<Self, AppError> {
        Self::from_str(value)
    }
}

impl FromStr for RoleName {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        // Backends disagree on casing and separators ("End-App-User", "end_app_user").
        let normalized: String = value
            .trim()
            .chars()
            .filter(|character| !matches!(character, '-' | '_' | ' '))
            .map(|character| character.to_ascii_lowercase())
            .collect();

        match normalized.as_str() {
            "superadmin" => Ok(Self::SuperAdmin),
            "admin" => Ok(Self::Admin),
            "agronomist" => Ok(Self::Agronomist),
            "analyst" => Ok(Self::Analyst),
            "business" => Ok(Self::Business),
            "developer" => Ok(Self::Developer),
            "support" => Ok(Self::Support),
            "endappuser" => Ok(Self::EndAppUser),
            _ => Err(AppError::Validation(format!("unknown role value '{value}'"))),
        }
    }
}

impl std::fmt::Display for RoleName {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Unordered set of roles held by one user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleSet(BTreeSet<RoleName>);

/// Outcome of parsing an untyped role collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRoles {
    /// Roles that matched the closed set.
    pub roles: RoleSet,
    /// Raw tags that were dropped.
    pub unrecognized: Vec<String>,
}

impl RoleSet {
    /// Creates an empty role set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses transport tags, dropping anything outside the closed set.
    #[must_use]
    pub fn from_transport<'a>(values: impl IntoIterator<Item = &'a str>) -> ParsedRoles {
        let mut roles = BTreeSet::new();
        let mut unrecognized = Vec::new();

        for value in values {
            match RoleName::from_transport(value) {
                Ok(role) => {
                    roles.insert(role);
                }
                Err(_) => unrecognized.push(value.to_owned()),
            }
        }

        ParsedRoles {
            roles: Self(roles),
            unrecognized,
        }
    }

    /// Returns whether the role is held.
    #[must_use]
    pub fn contains(&self, role: RoleName) -> bool {
        self.0.contains(&role)
    }

    /// Returns whether at least one of the roles is held.
    #[must_use]
    pub fn contains_any(&self, roles: &[RoleName]) -> bool {
        roles.iter().any(|role| self.contains(*role))
    }

    /// Returns the single held role, if exactly one is held.
    #[must_use]
    pub fn only(&self) -> Option<RoleName> {
        if self.0.len() == 1 {
            self.0.iter().next().copied()
        } else {
            None
        }
    }

    /// Returns whether no role is held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of held roles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates roles in a stable order.
    pub fn iter(&self) -> impl Iterator<Item = RoleName> + '_ {
        self.0.iter().copied()
    }

    /// Returns transport values in a stable order.
    #[must_use]
    pub fn to_transport(&self) -> Vec<String> {
        self.iter().map(|role| role.as_str().to_owned()).collect()
    }
}

impl FromIterator<RoleName> for RoleSet {
    fn from_iter<T: IntoIterator<Item = RoleName>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
