//! Casting service error types.
//!
//! All errors map to appropriate HTTP status codes via the `IntoResponse` impl.
//! The response body is always `{ "code": ..., "description": ... }`.
//! Internal details (database errors) are logged server-side, never returned.

use crate::auth::AuthError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// `WWW-Authenticate` challenge for a request that sent no credentials.
const WWW_AUTHENTICATE_BARE: &str = "Bearer realm=\"casting-api\"";

/// `WWW-Authenticate` challenge for every other 401.
const WWW_AUTHENTICATE_INVALID_TOKEN: &str =
    "Bearer realm=\"casting-api\", error=\"invalid_token\"";

/// Service-level error type.
///
/// Maps to HTTP status codes:
/// - Auth: 401 or 403 depending on the variant
/// - InvalidRequestBody: 422 Unprocessable Entity
/// - NotFound: 404 Not Found
/// - Database, Internal: 500 Internal Server Error
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Invalid request body: {0}")]
    InvalidRequestBody(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::Auth(err) => err.status_code(),
            ApiError::InvalidRequestBody(_) => 422,
            ApiError::NotFound(_) => 404,
            ApiError::Database(_) | ApiError::Internal => 500,
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    code: String,
    description: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, description) = match &self {
            ApiError::Auth(err) => {
                let status = if err.status_code() == 403 {
                    StatusCode::FORBIDDEN
                } else {
                    StatusCode::UNAUTHORIZED
                };
                (status, err.code(), err.to_string())
            }
            ApiError::InvalidRequestBody(reason) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "invalid_request_body",
                reason.clone(),
            ),
            ApiError::NotFound(resource) => {
                (StatusCode::NOT_FOUND, "not_found", resource.clone())
            }
            ApiError::Database(err) => {
                tracing::error!(target: "casting.database", error = %err, "Database operation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
            ApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "An internal error occurred".to_string(),
            ),
        };

        let body = ErrorResponse {
            code: code.to_string(),
            description,
        };

        let challenge = match &self {
            ApiError::Auth(AuthError::MissingHeader) => WWW_AUTHENTICATE_BARE,
            _ => WWW_AUTHENTICATE_INVALID_TOKEN,
        };

        let mut response = (status, Json(body)).into_response();

        if status == StatusCode::UNAUTHORIZED {
            if let Ok(header_value) = challenge.parse() {
                response
                    .headers_mut()
                    .insert("WWW-Authenticate", header_value);
            }
        }

        response
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        ApiError::Auth(self).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::Database(err.to_string())
    }
}
