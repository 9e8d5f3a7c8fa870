use std::fmt::{Debug, Formatter};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{AppResult, NonEmptyString};

/// Opaque authentication token issued by the backend login endpoint.
///
/// The raw value is only exposed through [`SessionToken::expose`] so that it is
/// never written to logs by accident; use [`SessionToken::fingerprint`] instead.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(NonEmptyString);

impl SessionToken {
    /// Creates a token from a non-empty transport value.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        NonEmptyString::new(value).map(Self)
    }

    /// Returns the raw token for use as a request credential.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }

    /// Returns a short, stable, non-reversible identifier for log correlation.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.0.as_str().as_bytes());
        digest
            .iter()
            .take(6)
            .map(|byte| format!("{byte:02x}"))
            .collect()
    }
}

impl Debug for SessionToken {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "SessionToken({})", self.fingerprint())
    }
}

#[cfg(test)]
mod tests {
    use super::SessionToken;

    #[test]
    fn token_rejects_blank_values() {
        assert!(SessionToken::new("  ").is_err());
    }

    #[test]
    fn debug_output_hides_raw_token() {
        let token = SessionToken::new("super-secret-token").unwrap_or_else(|_| unreachable!());
        let rendered = format!("{token:?}");

        assert!(!rendered.contains("super-secret-token"));
        assert_eq!(token.fingerprint().len(), 12);
    }

    #[test]
    fn fingerprint_is_stable_per_value() {
        let first = SessionToken::new("abc").unwrap_or_else(|_| unreachable!());
        let second = SessionToken::new("abc").unwrap_or_else(|_| unreachable!());
        let other = SessionToken::new("abd").unwrap_or_else(|_| unreachable!());

        assert_eq!(first.fingerprint(), second.fingerprint());
        assert_ne!(first.fingerprint(), other.fingerprint());
    }
}
