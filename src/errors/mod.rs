use std::io;
use axum::{http::StatusCode, response::{IntoResponse, Response}};

/// Failures raised by a page backend
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// No page is stored under the key. Every read failure is reported this way.
    #[error("page not found")]
    NotFound,
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Failures raised by the template collaborator
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("template {0} rendered with the wrong kind of data")]
    DataMismatch(&'static str),
}

/// Custom error types for the wiki application
#[derive(Debug, thiserror::Error)]
pub enum WikiError {
    #[error("invalid page title")]
    InvalidTitle,
    #[error("not found")]
    NotFound,
    #[error("invalid path")]
    InvalidPath,
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("render error: {0}")]
    Render(#[from] RenderError),
    #[error("configuration error: {0}")]
    Config(String),
}

impl IntoResponse for WikiError {
    fn into_response(self) -> Response {
        match self {
            WikiError::InvalidTitle | WikiError::NotFound | WikiError::InvalidPath => {
                (StatusCode::NOT_FOUND, "404 page not found\n").into_response()
            }
            WikiError::Storage(StorageError::NotFound) => {
                (StatusCode::NOT_FOUND, "404 page not found\n").into_response()
            }
            WikiError::Io(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("I/O error: {}", e),
            )
                .into_response(),
            WikiError::Storage(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                e.to_string(),
            )
                .into_response(),
            WikiError::Render(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Render error: {}", e),
            )
                .into_response(),
            WikiError::Config(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Configuration error: {}", e),
            )
                .into_response(),
        }
    }
}
