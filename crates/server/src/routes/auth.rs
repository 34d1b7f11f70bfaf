use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequestParts, State},
    http::{header, request::Parts, StatusCode},
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use axum_extra::extract::WithRejection;
use sea_orm::DatabaseConnection;

use service::auth::{domain::{AccessToken, AuthUser, LoginInput}, repo::seaorm::SeaOrmAuthRepository, AuthService};
use service::identity::Identity;
use service::location::{LocationService, SeaOrmLocationRepository};

use crate::errors::ApiError;

pub const AUTH_COOKIE: &str = "auth_token";

#[derive(Clone)]
pub struct ServerState {
    pub db: DatabaseConnection,
    pub auth: Arc<AuthService<SeaOrmAuthRepository>>,
    pub locations: Arc<LocationService<SeaOrmLocationRepository>>,
}

impl ServerState {
    pub fn new(db: DatabaseConnection, auth_cfg: service::auth::AuthConfig) -> Self {
        let auth = AuthService::new(Arc::new(SeaOrmAuthRepository::new(db.clone())), auth_cfg);
        let locations = LocationService::new(Arc::new(SeaOrmLocationRepository::new(db.clone())));
        Self { db, auth: Arc::new(auth), locations: Arc::new(locations) }
    }
}

#[utoipa::path(
    post, path = "/api/v1/login/access-token", tag = "login",
    request_body = crate::openapi::LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = crate::openapi::TokenDoc),
        (status = 400, description = "Incorrect email or password / Inactive user")
    )
)]
pub async fn login_access_token(
    State(state): State<ServerState>,
    jar: CookieJar,
    WithRejection(Json(input), _): WithRejection<Json<LoginInput>, ApiError>,
) -> Result<(CookieJar, Json<AccessToken>), ApiError> {
    let session = state.auth.login(input).await?;
    let mut cookie = Cookie::new(AUTH_COOKIE, session.token.access_token.clone());
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_secure(false);
    cookie.set_same_site(SameSite::Lax);
    Ok((jar.add(cookie), Json(session.token)))
}

pub async fn logout(jar: CookieJar) -> (CookieJar, StatusCode) {
    let jar = jar.remove(Cookie::from(AUTH_COOKIE));
    (jar, StatusCode::NO_CONTENT)
}

/// Authenticated caller, resolved from `Authorization: Bearer <token>` or,
/// failing that, the `auth_token` cookie.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub AuthUser);

impl CurrentUser {
    pub fn identity(&self) -> Identity { self.0.identity() }
}

fn bearer_token(parts: &Parts) -> Result<String, ApiError> {
    let path = parts.uri.path();
    if let Some(h) = parts.headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        return match h.strip_prefix("Bearer ") {
            Some(t) if !t.trim().is_empty() => Ok(t.trim().to_string()),
            _ => {
                tracing::warn!(path = %path, "invalid Authorization format (expect Bearer)");
                Err(ApiError::new(StatusCode::UNAUTHORIZED, "Could not validate credentials"))
            }
        };
    }
    let jar = CookieJar::from_headers(&parts.headers);
    match jar.get(AUTH_COOKIE).map(|c| c.value().to_string()) {
        Some(t) if !t.is_empty() => Ok(t),
        _ => {
            tracing::warn!(path = %path, "missing Authorization header and auth_token cookie");
            Err(ApiError::new(StatusCode::UNAUTHORIZED, "Not authenticated"))
        }
    }
}

#[async_trait]
impl FromRequestParts<ServerState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &ServerState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let user = state.auth.authenticate(&token).await.map_err(|e| {
            tracing::warn!(path = %parts.uri.path(), err = %e, "token rejected");
            ApiError::from(e)
        })?;
        Ok(CurrentUser(user))
    }
}
