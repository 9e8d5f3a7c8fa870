use std::time::Duration;

/// Tuning for identity lookups and cache revalidation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Upper bound for one identity lookup.
    pub lookup_timeout: Duration,
    /// Age after which a cached snapshot is revalidated; `None` trusts it forever.
    pub revalidate_after: Option<Duration>,
}

impl ResolverConfig {
    /// Creates a resolver configuration.
    #[must_use]
    pub fn new(lookup_timeout: Duration, revalidate_after: Option<Duration>) -> Self {
        Self {
            lookup_timeout,
            revalidate_after,
        }
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            lookup_timeout: Duration::from_secs(5),
            revalidate_after: Some(Duration::from_secs(300)),
        }
    }
}
