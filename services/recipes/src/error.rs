//! Custom error types for the recipe service

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, warn};

use crate::repositories::RepositoryError;

/// Custom error type for the recipe service
#[derive(Error, Debug)]
pub enum AppError {
    /// Requested resource does not exist
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Persistence failure
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Session store failure
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Template rendering failure
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound(what) => {
                warn!("{} not found", what);
                (StatusCode::NOT_FOUND, format!("{} not found", what)).into_response()
            }
            other => {
                error!("Request failed: {}", other);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

/// Type alias for handler results
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_404() {
        let response = AppError::NotFound("Recipe").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_infrastructure_errors_map_to_500() {
        let duplicate = RepositoryError::DuplicateEmail("a@b.co".to_string());
        let response = AppError::from(duplicate).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
