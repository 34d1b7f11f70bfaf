//! Offset pagination for list endpoints.
//!
//! `skip`/`limit` are unsigned, so negative values are rejected at
//! deserialization time. No upper bound is applied to `limit`.

use serde::Deserialize;

pub const DEFAULT_LIMIT: u64 = 100;

/// Pagination parameters
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct ListParams {
    /// rows to skip before the page starts
    #[serde(default)]
    pub skip: u64,
    /// maximum rows in the page
    #[serde(default = "default_limit")]
    pub limit: u64,
}

fn default_limit() -> u64 { DEFAULT_LIMIT }

impl Default for ListParams {
    fn default() -> Self { Self { skip: 0, limit: DEFAULT_LIMIT } }
}

impl ListParams {
    pub fn new(skip: u64, limit: u64) -> Self { Self { skip, limit } }
}
