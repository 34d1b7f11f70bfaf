use axum::{extract::{Path, Query, State}, Json};
use axum_extra::extract::WithRejection;
use tracing::info;
use uuid::Uuid;

use common::types::Message;
use models::location::{self, LocationPatch, NewLocation};
use service::location::LocationsPage;
use service::pagination::ListParams;

use crate::errors::ApiError;
use crate::routes::auth::{CurrentUser, ServerState};

#[utoipa::path(
    get, path = "/api/v1/locations/", tag = "locations",
    params(crate::openapi::ListQueryDoc),
    responses(
        (status = 200, description = "Page of locations and total count", body = crate::openapi::LocationsPageDoc),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer" = []))
)]
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
    WithRejection(Query(params), _): WithRejection<Query<ListParams>, ApiError>,
) -> Result<Json<LocationsPage>, ApiError> {
    let page = state.locations.list(&user.identity(), params).await?;
    info!(count = page.count, returned = page.data.len(), user_id = %user.0.id, "list locations");
    Ok(Json(page))
}

#[utoipa::path(
    get, path = "/api/v1/locations/{id}", tag = "locations",
    params(("id" = Uuid, Path, description = "Location ID")),
    responses(
        (status = 200, description = "OK", body = crate::openapi::LocationDoc),
        (status = 400, description = "Not enough permissions"),
        (status = 404, description = "Location not found")
    ),
    security(("bearer" = []))
)]
pub async fn get(
    State(state): State<ServerState>,
    user: CurrentUser,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
) -> Result<Json<location::Model>, ApiError> {
    Ok(Json(state.locations.get(&user.identity(), id).await?))
}

#[utoipa::path(
    post, path = "/api/v1/locations/", tag = "locations",
    request_body = crate::openapi::NewLocationDoc,
    responses(
        (status = 200, description = "Created", body = crate::openapi::LocationDoc),
        (status = 422, description = "Validation Error")
    ),
    security(("bearer" = []))
)]
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    WithRejection(Json(input), _): WithRejection<Json<NewLocation>, ApiError>,
) -> Result<Json<location::Model>, ApiError> {
    Ok(Json(state.locations.create(&user.identity(), input).await?))
}

#[utoipa::path(
    put, path = "/api/v1/locations/{id}", tag = "locations",
    params(("id" = Uuid, Path, description = "Location ID")),
    request_body = crate::openapi::LocationPatchDoc,
    responses(
        (status = 200, description = "Updated", body = crate::openapi::LocationDoc),
        (status = 400, description = "Not enough permissions"),
        (status = 404, description = "Location not found"),
        (status = 422, description = "Validation Error")
    ),
    security(("bearer" = []))
)]
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
    WithRejection(Json(patch), _): WithRejection<Json<LocationPatch>, ApiError>,
) -> Result<Json<location::Model>, ApiError> {
    Ok(Json(state.locations.update(&user.identity(), id, patch).await?))
}

#[utoipa::path(
    delete, path = "/api/v1/locations/{id}", tag = "locations",
    params(("id" = Uuid, Path, description = "Location ID")),
    responses(
        (status = 200, description = "Deleted", body = crate::openapi::MessageDoc),
        (status = 400, description = "Not enough permissions"),
        (status = 404, description = "Location not found")
    ),
    security(("bearer" = []))
)]
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
) -> Result<Json<Message>, ApiError> {
    Ok(Json(state.locations.delete(&user.identity(), id).await?))
}
