//! Error types for the cache library and diagnostics server
//!
//! Provides unified error handling using thiserror. Cache misses are never
//! errors; they are reported as `None`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for registry construction and the HTTP surface.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Key not present (or expired) in a domain, surfaced by the HTTP layer
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Domain name is not part of the registry's configuration
    #[error("Unknown cache domain: {0}")]
    UnknownDomain(String),

    /// Rejected cache or registry configuration
    #[error("Invalid cache configuration: {0}")]
    InvalidConfig(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NotFound(_) | CacheError::UnknownDomain(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::InvalidConfig(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for cache operations that can fail.
pub type Result<T> = std::result::Result<T, CacheError>;

// == Load Error ==
/// Failure of a cached load.
///
/// The producer's own error is carried unchanged in `Producer`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError<E> {
    /// The producer returned an error; nothing was cached
    #[error("producer failed: {0}")]
    Producer(E),

    /// The load task was torn down by the runtime before it finished
    #[error("load task aborted before completion")]
    Aborted,
}
