use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde_json::json;
use thiserror::Error;

/// Errors raised by the record store and the metrics engine.
///
/// Validation and lookup failures are detected before any write reaches the
/// database, so a returned error never leaves a partially applied mutation.
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed or out-of-range input (400 Bad Request)
    #[error("Validation error in field '{field}': {message}")]
    Validation { field: String, message: String },
    /// Referenced identity does not exist (404 Not Found)
    #[error("{resource} with id '{id}' not found")]
    NotFound { resource: String, id: String },
    /// Underlying database file or connection failure (500 Internal Server Error)
    #[error("Storage error: {0}")]
    Storage(#[from] DbErr),
}

impl AppError {
    fn code(&self) -> &'static str {
        match self {
            AppError::Validation { .. } => "VALIDATION_ERROR",
            AppError::NotFound { .. } => "RESOURCE_NOT_FOUND",
            AppError::Storage(_) => "STORAGE_ERROR",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            AppError::Validation { .. } => "Validation",
            AppError::NotFound { .. } => "NotFound",
            AppError::Storage(_) => "Storage",
        }
    }
}

/// Convert `AppError` to HTTP responses
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Storage(err) = &self {
            tracing::error!(error = %err, "storage failure");
        }

        let body = Json(json!({
            "error": {
                "code": self.code(),
                "message": self.to_string(),
                "type": self.kind(),
            }
        }));

        (self.status(), body).into_response()
    }
}

#[macro_export]
macro_rules! validation_error {
    ($field:expr, $message:expr) => {
        $crate::common::errors::AppError::Validation {
            field: $field.to_string(),
            message: $message.to_string(),
        }
    };
}

#[macro_export]
macro_rules! not_found {
    ($resource:expr, $id:expr) => {
        $crate::common::errors::AppError::NotFound {
            resource: $resource.to_string(),
            id: $id.to_string(),
        }
    };
}

/// Result type alias for record store and metrics operations
pub type AppResult<T> = Result<T, AppError>;

/// Lets `CRUDResource` hooks, which must return `DbErr`, reuse the service
/// layer. Lookup failures keep their meaning as `RecordNotFound`.
impl From<AppError> for DbErr {
    fn from(err: AppError) -> Self {
        let message = err.to_string();
        match err {
            AppError::Storage(inner) => inner,
            AppError::NotFound { .. } => DbErr::RecordNotFound(message),
            AppError::Validation { .. } => DbErr::Custom(message),
        }
    }
}
