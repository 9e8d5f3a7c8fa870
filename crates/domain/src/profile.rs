//! User profile snapshot returned by the identity endpoint.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{RoleName, RoleSet};

const KNOWN_FIELDS: &[&str] = &["id", "full_name", "email", "roles"];

/// Identity snapshot for the authenticated user.
///
/// Additional profile fields (phone, farm, avatar, ...) are preserved as opaque
/// attributes so that the cached snapshot can be handed to the UI unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    id: String,
    full_name: String,
    email: Option<String>,
    roles: RoleSet,
    #[serde(flatten)]
    attributes: Map<String, Value>,
}

/// Outcome of parsing an untyped identity payload.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedProfile {
    /// Validated profile.
    pub profile: UserProfile,
    /// Role tags dropped because they fall outside the closed role set.
    pub unrecognized_roles: Vec<String>,
}

impl UserProfile {
    /// Creates a profile from identity fields.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        full_name: impl Into<String>,
        email: Option<String>,
        roles: RoleSet,
    ) -> Self {
        Self {
            id: id.into(),
            full_name: full_name.into(),
            email,
            roles,
            attributes: Map::new(),
        }
    }

    /// Parses an identity payload.
    ///
    /// Never fails: a missing or malformed `roles` field yields an empty role set,
    /// and roles may be sent either as strings or as `{"name": ...}` objects.
    #[must_use]
    pub fn from_identity_payload(payload: &Value) -> ParsedProfile {
        let object = payload.as_object();
        let field = |name: &str| object.and_then(|object| object.get(name));

        let id = match field("id") {
            Some(Value::String(value)) => value.clone(),
            Some(Value::Number(value)) => value.to_string(),
            _ => String::new(),
        };
        let full_name = ["full_name", "name", "username"]
            .iter()
            .find_map(|name| field(name).and_then(Value::as_str))
            .unwrap_or_default()
            .to_owned();
        let email = field("email")
            .and_then(Value::as_str)
            .filter(|value| !value.trim().is_empty())
            .map(ToOwned::to_owned);

        let role_tags: Vec<&str> = field("roles")
            .and_then(Value::as_array)
            .map(|values| values.iter().filter_map(role_tag).collect())
            .unwrap_or_default();
        let parsed_roles = RoleSet::from_transport(role_tags);

        let attributes = object
            .map(|object| {
                object
                    .iter()
                    .filter(|(key, _)| !KNOWN_FIELDS.contains(&key.as_str()))
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect()
            })
            .unwrap_or_default();

        ParsedProfile {
            profile: Self {
                id,
                full_name,
                email,
                roles: parsed_roles.roles,
                attributes,
            },
            unrecognized_roles: parsed_roles.unrecognized,
        }
    }

    /// Returns the backend identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        self.id.as_str()
    }

    /// Returns the display name.
    #[must_use]
    pub fn full_name(&self) -> &str {
        self.full_name.as_str()
    }

    /// Returns the email, if the backend returned one.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Returns the held roles.
    #[must_use]
    pub fn roles(&self) -> &RoleSet {
        &self.roles
    }

    /// Returns whether the profile holds the role.
    #[must_use]
    pub fn has_role(&self, role: RoleName) -> bool {
        self.roles.contains(role)
    }

    /// Returns an extra profile field.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }
}

fn role_tag(value: &Value) -> Option<&str> {
    match value {
        Value::String(tag) => Some(tag.as_str()),
        Value::Object(object) => object.get("name").and_then(Value::as_str),
        _ => None,
    }
}
