//! API error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use leaflet_app::AppError;
use leaflet_metadata::MetadataError;
use serde::Serialize;

/// API error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("conflict: {0}")]
    Conflict(String),

    /// Signed in, but no account has been created for the identity yet.
    #[error("first login pending: {0}")]
    FirstLoginPending(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("metadata error: {0}")]
    Metadata(#[from] MetadataError),
}

impl ApiError {
    /// Get the error code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::BadRequest(_) => "bad_request",
            Self::Unauthorized(_) => "unauthorized",
            Self::Forbidden(_) => "forbidden",
            Self::Conflict(_) => "conflict",
            Self::FirstLoginPending(_) => "first_login_pending",
            Self::Internal(_) => "internal_error",
            Self::Metadata(_) => "metadata_error",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Conflict(_) | Self::FirstLoginPending(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Metadata(MetadataError::NotFound { .. }) => StatusCode::NOT_FOUND,
            Self::Metadata(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        let message = err.to_string();
        match err {
            AppError::NotFound { .. } => Self::NotFound(message),
            AppError::NotAuthorized { .. } => Self::Forbidden(message),
            AppError::Validation { .. } => Self::BadRequest(message),
            AppError::AlreadyExists { .. } => Self::Conflict(message),
            AppError::FirstLoginPending { ident } => Self::FirstLoginPending(ident.to_string()),
            AppError::Provider(e) => {
                tracing::error!(error = %e, "upload provider failure");
                Self::Internal(message)
            }
            AppError::Storage(e) => Self::Metadata(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.code(), error = %self, "request failed");
        }
        let body = ErrorResponse {
            code: self.code().to_string(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use leaflet_core::Ident;

    #[test]
    fn test_app_errors_map_to_status() {
        let cases = [
            (
                AppError::NotFound {
                    entity: "page".to_string(),
                    id: "alice/blog".to_string(),
                },
                StatusCode::NOT_FOUND,
                "not_found",
            ),
            (
                AppError::NotAuthorized {
                    operation: "update page".to_string(),
                },
                StatusCode::FORBIDDEN,
                "forbidden",
            ),
            (
                AppError::Validation {
                    field: "name",
                    message: "too short".to_string(),
                },
                StatusCode::BAD_REQUEST,
                "bad_request",
            ),
            (
                AppError::AlreadyExists {
                    entity: "user",
                    id: "alice".to_string(),
                },
                StatusCode::CONFLICT,
                "conflict",
            ),
            (
                AppError::FirstLoginPending {
                    ident: Ident::new("test", "alice"),
                },
                StatusCode::CONFLICT,
                "first_login_pending",
            ),
            (
                AppError::Storage(MetadataError::Corrupt("bad".to_string())),
                StatusCode::INTERNAL_SERVER_ERROR,
                "metadata_error",
            ),
        ];

        for (app_err, status, code) in cases {
            let err = ApiError::from(app_err);
            assert_eq!(err.status_code(), status);
            assert_eq!(err.code(), code);
        }
    }

    #[test]
    fn test_first_login_message_names_ident() {
        let err = ApiError::from(AppError::FirstLoginPending {
            ident: Ident::new("github", "42"),
        });
        assert_eq!(err.to_string(), "first login pending: github:42");
    }
}
