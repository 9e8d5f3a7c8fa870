//! Role resolution for guarded route mounts.
//!
//! Prefers the cached profile snapshot, falls back to one identity lookup, and
//! degrades to cached or role-less state on transient failures. Every outcome is
//! a [`agrogate_domain::RoleResolution`]; nothing is surfaced as an error.

mod config;
mod service;

pub use config::ResolverConfig;
pub use service::{ResolutionOutcome, RoleResolver};
