//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod http_identity_client;

pub use http_identity_client::HttpIdentityClient;
