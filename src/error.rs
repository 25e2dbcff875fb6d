// Error handling module for the Item API
// Provides the single HTTP error type every handler and extractor returns

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, error, warn};

use crate::auth::error::{AuthFailure, HashingError, TokenError};
use crate::store::StoreError;
use crate::validation::FieldErrors;

/// Main error type for the API
/// All handlers should return Result<T, ApiError>
///
/// 400 and login 401 bodies are flat field -> message maps; every other
/// failure uses `ErrorResponse`.
#[derive(Debug)]
pub enum ApiError {
    /// Request payload failed validation rules
    /// Maps to HTTP 400 Bad Request
    Validation(FieldErrors),

    /// Body was not JSON of the expected shape
    /// Maps to HTTP 400 Bad Request
    MalformedBody(String),

    /// Login with an unknown email or a wrong password
    /// Maps to HTTP 401 Unauthorized
    InvalidCredentials(FieldErrors),

    /// Bearer token missing or not trusted
    /// Maps to HTTP 401 Unauthorized
    Unauthorized(AuthFailure),

    /// Resource missing or owned by someone else
    /// Maps to HTTP 404 Not Found
    NotFound,

    /// Database operation errors
    /// Maps to HTTP 500 Internal Server Error
    Storage(sqlx::Error),

    /// Password hashing errors
    /// Maps to HTTP 500 Internal Server Error
    Hashing(HashingError),

    /// Token signing errors
    /// Maps to HTTP 500 Internal Server Error
    Token(TokenError),
}

/// Consistent error response structure for non-field errors
#[derive(Serialize)]
pub struct ErrorResponse {
    /// Machine-readable error code (e.g., "NOT_FOUND", "UNAUTHORIZED")
    pub error_code: String,

    /// Human-readable error message
    pub message: String,

    /// ISO 8601 timestamp of when the error occurred
    pub timestamp: String,
}

impl ErrorResponse {
    fn new(error_code: &str, message: &str) -> Self {
        Self {
            error_code: error_code.to_string(),
            message: message.to_string(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

impl ApiError {
    /// Single-field error map, e.g. `{"email": "Incorrect email address"}`
    pub fn field(field: &str, message: &str) -> FieldErrors {
        FieldErrors::from([(field.to_string(), message.to_string())])
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::MalformedBody(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidCredentials(_) | ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Storage(_) | ApiError::Hashing(_) | ApiError::Token(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    /// Log at a level matching severity, then render the client-facing body
    ///
    /// Internal error detail only reaches the log; the client sees a generic message.
    fn into_response(self) -> Response {
        let status = self.status_code();

        match self {
            ApiError::Validation(errors) => {
                debug!("Validation error: {:?}", errors.keys().collect::<Vec<_>>());
                (status, Json(errors)).into_response()
            }
            ApiError::MalformedBody(reason) => {
                debug!("Malformed request body: {}", reason);
                (status, Json(ApiError::field("body", &reason))).into_response()
            }
            ApiError::InvalidCredentials(errors) => {
                warn!("Failed login attempt");
                (status, Json(errors)).into_response()
            }
            ApiError::Unauthorized(failure) => {
                warn!("Unauthorized request: {}", failure);
                let body = ErrorResponse::new("UNAUTHORIZED", "Invalid or missing authentication token");
                (status, Json(body)).into_response()
            }
            ApiError::NotFound => {
                (status, Json(ErrorResponse::new("NOT_FOUND", "Resource not found"))).into_response()
            }
            ApiError::Storage(e) => {
                error!("Database error: {:?}", e);
                internal(status)
            }
            ApiError::Hashing(e) => {
                error!("Password hashing error: {}", e);
                internal(status)
            }
            ApiError::Token(e) => {
                error!("Token error: {}", e);
                internal(status)
            }
        }
    }
}

fn internal(status: StatusCode) -> Response {
    let body = ErrorResponse::new("INTERNAL_ERROR", "An internal server error occurred");
    (status, Json(body)).into_response()
}

impl From<sqlx::Error> for ApiError {
    fn from(error: sqlx::Error) -> Self {
        ApiError::Storage(error)
    }
}

/// `DuplicateEmail` becomes a field error on `email`
impl From<StoreError> for ApiError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::DuplicateEmail => ApiError::Validation(ApiError::field(
                "email",
                "A user with this email address already exists",
            )),
            // Only a verified token whose user is gone can name a missing owner
            StoreError::UnknownOwner => ApiError::Unauthorized(AuthFailure::UnknownSubject),
            StoreError::Database(e) => ApiError::Storage(e),
        }
    }
}

impl From<HashingError> for ApiError {
    fn from(error: HashingError) -> Self {
        ApiError::Hashing(error)
    }
}

impl From<TokenError> for ApiError {
    fn from(error: TokenError) -> Self {
        ApiError::Token(error)
    }
}

impl From<AuthFailure> for ApiError {
    fn from(failure: AuthFailure) -> Self {
        ApiError::Unauthorized(failure)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::MalformedBody(rejection.body_text())
    }
}
