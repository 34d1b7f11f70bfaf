//! Location resource: ownership-scoped CRUD over `models::location`.

pub mod repository;
pub mod service;

use serde::Serialize;

pub use repository::{LocationRepository, SeaOrmLocationRepository};
pub use service::LocationService;

/// One page of locations plus the unpaginated total for the same filter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationsPage {
    pub data: Vec<models::location::Model>,
    pub count: u64,
}

pub const DELETED_MESSAGE: &str = "Location deleted successfully";
