//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  /// Query building, engine calls made through the core, or formatting.
  #[error(transparent)]
  Core(#[from] namesdb_core::Error),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  /// The linked-object API could not be reached.
  #[error("upstream error: {0}")]
  Upstream(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = match &self {
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Core(_) | ApiError::Store(_) | ApiError::Upstream(_) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
    };
    let message = match &self {
      ApiError::NotFound(m) | ApiError::BadRequest(m) => m.clone(),
      other => {
        error!(error = %other, "request failed");
        other.to_string()
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
