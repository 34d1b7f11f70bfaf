use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::{debug, error};

use service::auth::errors::AuthError;
use service::errors::ServiceError;

/// Error response rendered as `{"detail": "..."}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self { status, detail: detail.into() }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(serde_json::json!({ "detail": self.detail }))).into_response()
    }
}

// Extractor rejections keep axum's status (422 for a well-formed body of the
// wrong shape, 400 for syntax and path/query parse failures) but use the
// `{"detail"}` body like every other error.
impl From<JsonRejection> for ApiError {
    fn from(r: JsonRejection) -> Self {
        debug!(status = %r.status(), err = %r.body_text(), "json body rejected");
        ApiError::new(r.status(), r.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(r: PathRejection) -> Self {
        debug!(status = %r.status(), err = %r.body_text(), "path rejected");
        ApiError::new(r.status(), r.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(r: QueryRejection) -> Self {
        debug!(status = %r.status(), err = %r.body_text(), "query rejected");
        ApiError::new(r.status(), r.body_text())
    }
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::NotFound(msg) => ApiError::new(StatusCode::NOT_FOUND, msg),
            // kept at 400 for compatibility with existing clients
            ServiceError::Forbidden => ApiError::new(StatusCode::BAD_REQUEST, "Not enough permissions"),
            ServiceError::Validation(msg) => ApiError::new(StatusCode::UNPROCESSABLE_ENTITY, msg),
            ServiceError::Db(msg) => {
                error!(err = %msg, "database failure");
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        let status = match &e {
            AuthError::Unauthorized | AuthError::Inactive => StatusCode::BAD_REQUEST,
            AuthError::InvalidToken => StatusCode::UNAUTHORIZED,
            AuthError::NotFound => StatusCode::NOT_FOUND,
            AuthError::Conflict => StatusCode::CONFLICT,
            AuthError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AuthError::HashError(_) | AuthError::TokenError(_) | AuthError::Repository(_) => {
                error!(err = %e, code = e.code(), "auth failure");
                return ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error");
            }
        };
        ApiError::new(status, e.to_string())
    }
}
