/// Error handling for the API server
///
/// Every handler returns `ApiResult<T>`. Errors render as a single JSON
/// envelope:
///
/// ```json
/// { "detail": "Vehicle already exists with id 3" }
/// ```
///
/// Validation failures add a per-field list:
///
/// ```json
/// { "detail": "Request validation failed", "errors": [{ "field": "vin", "message": "..." }] }
/// ```

use autoshop_shared::auth::{authorization::AuthError, jwt::TokenError, password::PasswordError};
use autoshop_shared::db::is_unique_violation;
use axum::{
    extract::rejection::{FormRejection, JsonRejection, PathRejection},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

pub const INVALID_CREDENTIALS: &str = "Incorrect username or password.";
pub const INVALID_USERNAME: &str = "Username is invalid or already registered";

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),

    /// Username taken or unusable (400)
    InvalidUsername,

    /// Unauthorized (401), sent with `WWW-Authenticate: Bearer`
    Unauthorized(String),

    /// Forbidden (403)
    Forbidden,

    /// Not found (404)
    NotFound(String),

    /// Unprocessable entity (422)
    ValidationError(Vec<ValidationErrorDetail>),

    /// Body or path the extractors could not read, with axum's status
    /// (400, 415 or 422)
    MalformedRequest(StatusCode, String),

    /// Internal server error (500), details only logged
    InternalError(String),
}

/// Validation error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    pub field: String,
    pub message: String,
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ValidationErrorDetail>>,
}

impl ApiError {
    /// 401 for a missing, malformed or expired token
    pub fn invalid_token() -> Self {
        ApiError::Unauthorized(AuthError::Unauthorized.to_string())
    }

    /// Maps a unique violation to `conflict`, anything else as usual
    pub fn on_conflict(err: sqlx::Error, conflict: ApiError) -> Self {
        if is_unique_violation(&err) {
            conflict
        } else {
            ApiError::from(err)
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::InvalidUsername => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::MalformedRequest(status, _) => *status,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::InvalidUsername => write!(f, "Bad request: {}", INVALID_USERNAME),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden => write!(f, "Forbidden: {}", AuthError::Forbidden),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::MalformedRequest(_, msg) => write!(f, "Malformed request: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let (detail, errors) = match self {
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::NotFound(msg)
            | ApiError::MalformedRequest(_, msg) => (msg, None),
            ApiError::InvalidUsername => (INVALID_USERNAME.to_string(), None),
            ApiError::Forbidden => (AuthError::Forbidden.to_string(), None),
            ApiError::ValidationError(errors) => {
                ("Request validation failed".to_string(), Some(errors))
            }
            ApiError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                ("An internal error occurred".to_string(), None)
            }
        };

        let mut response = (status, Json(ErrorResponse { detail, errors })).into_response();

        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }

        response
    }
}

/// Convert sqlx errors to API errors
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        if is_unique_violation(&err) {
            return ApiError::BadRequest("Resource already exists".to_string());
        }

        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            _ => ApiError::InternalError(format!("Database error: {}", err)),
        }
    }
}

/// Convert gate decisions to API errors
impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Unauthorized => ApiError::invalid_token(),
            AuthError::Forbidden => ApiError::Forbidden,
        }
    }
}

/// Convert token errors to API errors
///
/// Configuration and encoding failures are server faults; only a rejected
/// token is the caller's problem.
impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Invalid => ApiError::invalid_token(),
            TokenError::Config(_) | TokenError::Encode(_) => {
                ApiError::InternalError(format!("Token operation failed: {}", err))
            }
        }
    }
}

/// Convert password errors to API errors
impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::InternalError(format!("Password operation failed: {}", err))
    }
}

/// Convert JSON body rejections, keeping axum's status and message
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::MalformedRequest(rejection.status(), rejection.body_text())
    }
}

/// Convert form body rejections
impl From<FormRejection> for ApiError {
    fn from(rejection: FormRejection) -> Self {
        ApiError::MalformedRequest(rejection.status(), rejection.body_text())
    }
}

/// Convert path parameter rejections
impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::MalformedRequest(rejection.status(), rejection.body_text())
    }
}

/// Convert `validator` failures to a 422 with one entry per field error
impl From<validator::ValidationErrors> for ApiError {
    fn from(e: validator::ValidationErrors) -> Self {
        let mut errors: Vec<ValidationErrorDetail> = e
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| ValidationErrorDetail {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "Validation failed".to_string()),
                })
            })
            .collect();
        errors.sort_by(|a, b| a.field.cmp(&b.field));

        ApiError::ValidationError(errors)
    }
}
