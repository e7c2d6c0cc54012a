//! Unified error handling for the server.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use menuforge_core::catalog::ValidationError;
use menuforge_core::scope::ScopeError;

use crate::db::RepositoryError;

/// Application-level error type.
///
/// Read-scope violations surface as `NotFound` so the existence of other
/// tenants' data is never leaked; write-scope violations surface as
/// `Forbidden` since the caller's own identity is already known.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// The identity headers are missing a claim the role requires.
    #[error("Invalid context: {0}")]
    InvalidContext(String),

    /// The caller may not write the targeted resource.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Resource not found, or outside the caller's scope.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A structural invariant failed before any state was touched.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Unique-constraint conflict (e.g. duplicate brand name).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Deletion blocked because other rows still depend on the target.
    #[error("Dependency in use: {0}")]
    DependencyInUse(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Shorthand for the deliberately vague not-found response.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }
}

impl From<ScopeError> for AppError {
    fn from(err: ScopeError) -> Self {
        match err {
            ScopeError::MissingStoreId | ScopeError::MissingBrandId => {
                Self::InvalidContext(err.to_string())
            }
            ScopeError::MissingWriteTarget | ScopeError::ForeignWriteTarget => {
                Self::Forbidden(err.to_string())
            }
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Server-side failures go to Sentry; client errors do not.
        if matches!(
            self,
            Self::Database(
                RepositoryError::Database(_) | RepositoryError::DataCorruption(_)
            ) | Self::Internal(_)
        ) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Database(RepositoryError::NotFound) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Database(RepositoryError::Conflict(_)) | Self::Conflict(_) => {
                StatusCode::CONFLICT
            }
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::InvalidContext(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::DependencyInUse(_) => StatusCode::CONFLICT,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Database(RepositoryError::NotFound) => "Not found".to_string(),
            Self::Database(RepositoryError::Conflict(msg)) => format!("Conflict: {msg}"),
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        };

        (status, message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn errors_map_to_expected_status_codes() {
        assert_eq!(
            status_of(AppError::InvalidContext("x".into())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(AppError::Forbidden("x".into())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_of(AppError::NotFound("x".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(AppError::Validation("x".into())),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(AppError::Conflict("x".into())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(AppError::DependencyInUse("x".into())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(AppError::Internal("x".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn pool_errors_convert_through_the_repository_layer_to_500() {
        // Transaction begin/commit failures arrive as raw sqlx errors.
        let err = AppError::from(RepositoryError::from(sqlx::Error::PoolClosed));
        assert_eq!(status_of(err), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn repository_not_found_maps_to_404() {
        assert_eq!(
            status_of(AppError::Database(RepositoryError::NotFound)),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn scope_errors_split_into_context_and_forbidden() {
        assert!(matches!(
            AppError::from(ScopeError::MissingStoreId),
            AppError::InvalidContext(_)
        ));
        assert!(matches!(
            AppError::from(ScopeError::ForeignWriteTarget),
            AppError::Forbidden(_)
        ));
    }
}
