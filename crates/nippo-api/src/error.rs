//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error(transparent)]
  Store(#[from] nippo_core::Error),
}

impl ApiError {
  fn status(&self) -> StatusCode {
    use nippo_core::Error as E;
    let ApiError::Store(e) = self;
    match e {
      E::InvalidDate(_) => StatusCode::BAD_REQUEST,
      E::NotFound(_) => StatusCode::NOT_FOUND,
      E::Schema(_) => StatusCode::UNPROCESSABLE_ENTITY,
      E::Write(_) | E::Read(_) | E::Connection(_) => StatusCode::BAD_GATEWAY,
      E::Credential(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      tracing::warn!(error = %self, "request failed");
    }
    (status, Json(json!({ "error": self.to_string() }))).into_response()
  }
}
