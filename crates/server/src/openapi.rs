use chrono::{DateTime, FixedOffset};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};
use uuid::Uuid;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct LoginRequest { pub email: String, pub password: String }

#[derive(ToSchema)]
pub struct TokenDoc { pub access_token: String, pub token_type: String }

#[derive(ToSchema)]
pub struct MessageDoc { pub message: String }

#[derive(ToSchema)]
pub struct LocationDoc {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub item_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub datetime: DateTime<FixedOffset>,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

#[derive(ToSchema)]
pub struct NewLocationDoc {
    pub item_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub datetime: DateTime<FixedOffset>,
}

/// Every field is optional; only keys present in the body are applied.
/// `null` clears `item_id` and `description`.
#[derive(ToSchema)]
pub struct LocationPatchDoc {
    pub item_id: Option<Uuid>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub datetime: Option<DateTime<FixedOffset>>,
}

#[derive(ToSchema)]
pub struct LocationsPageDoc {
    pub data: Vec<LocationDoc>,
    pub count: u64,
}

#[derive(utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQueryDoc {
    /// rows to skip (default 0)
    pub skip: Option<u64>,
    /// page size (default 100)
    pub limit: Option<u64>,
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).bearer_format("JWT").build()),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::auth::login_access_token,
        crate::routes::locations::list,
        crate::routes::locations::create,
        crate::routes::locations::get,
        crate::routes::locations::update,
        crate::routes::locations::delete,
    ),
    components(
        schemas(
            HealthResponse,
            LoginRequest,
            TokenDoc,
            MessageDoc,
            LocationDoc,
            NewLocationDoc,
            LocationPatchDoc,
            LocationsPageDoc,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health"),
        (name = "login"),
        (name = "locations")
    )
)]
pub struct ApiDoc;
