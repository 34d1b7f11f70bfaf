//! Auth module: three-layer architecture (domain, repository, service).
//!
//! Password login, access tokens, and resolving a bearer token to the
//! [`Identity`](crate::identity::Identity) the location service acts for.

pub mod domain;
pub mod errors;
pub mod repository;
pub mod service;
pub mod repo;

pub use service::{AuthConfig, AuthService};
