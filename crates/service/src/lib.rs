//! Service layer providing business-oriented operations on top of models.
//! - Separates business logic from data access through repository traits.
//! - Reuses validation and entity definitions in `models` crate.
//! - Every operation takes the acting `Identity` explicitly.

pub mod errors;
pub mod identity;
pub mod pagination;
pub mod auth;
pub mod location;
#[cfg(test)]
pub mod test_support;
