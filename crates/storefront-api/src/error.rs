//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use storefront_core::ErrorKind;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  /// The caller headers were missing or malformed.
  #[error("missing or malformed caller identity")]
  Unauthorized,

  #[error(transparent)]
  Core(#[from] storefront_core::Error),
}

pub type Result<T, E = ApiError> = std::result::Result<T, E>;

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let core = match self {
      ApiError::Unauthorized => {
        let body = json!({
          "error": {
            "kind": "unauthorized",
            "message": "missing or malformed caller identity"
          }
        });
        return (StatusCode::UNAUTHORIZED, Json(body)).into_response();
      }
      ApiError::Core(e) => e,
    };

    let kind = core.kind();
    let status = match kind {
      ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
      ErrorKind::NotFound => StatusCode::NOT_FOUND,
      ErrorKind::Conflict => StatusCode::CONFLICT,
      ErrorKind::PersistenceFailure => StatusCode::INTERNAL_SERVER_ERROR,
    };

    // Storage detail goes to the log only.
    let message = match &core {
      storefront_core::Error::Persistence(source) => {
        tracing::error!(error = %source, "persistence failure");
        "internal storage error".to_owned()
      }
      storefront_core::Error::OrderProcessing(source) => {
        tracing::error!(error = %source, "order processing failed");
        core.to_string()
      }
      other => other.to_string(),
    };

    let body = json!({ "error": { "kind": kind, "message": message } });
    (status, Json(body)).into_response()
  }
}
