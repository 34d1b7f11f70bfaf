//! Shared building blocks for the locations workspace: response types that
//! are not tied to a single resource, and logging setup.

pub mod types;
pub mod utils;
