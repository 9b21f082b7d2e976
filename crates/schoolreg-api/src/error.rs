//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use schoolreg_core::{
  RowError,
  store::{StoreError, UniqueViolation},
  validate::ValidationErrors,
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("{0}")]
  Conflict(UniqueViolation),

  #[error(transparent)]
  Validation(ValidationErrors),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Classify a backend error by what the client can do about it.
  pub fn store<E: StoreError>(err: E) -> Self {
    if let Some(violation) = err.unique_violation() {
      Self::Conflict(violation)
    } else if err.is_not_found() {
      Self::NotFound(err.to_string())
    } else {
      Self::Store(Box::new(err))
    }
  }
}

impl From<RowError> for ApiError {
  fn from(err: RowError) -> Self {
    match err {
      RowError::Validation(errors) => Self::Validation(errors),
      RowError::UniquenessConflict(violation) => Self::Conflict(violation),
      RowError::Persistence(e) => Self::Store(e),
    }
  }
}

impl From<schoolreg_core::Error> for ApiError {
  fn from(err: schoolreg_core::Error) -> Self { RowError::from(err).into() }
}

impl From<schoolreg_import::Error> for ApiError {
  fn from(err: schoolreg_import::Error) -> Self {
    match err {
      schoolreg_import::Error::Join(e) => Self::Store(Box::new(e)),
      other => Self::BadRequest(other.to_string()),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, body) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, json!({ "error": m })),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, json!({ "error": m })),
      ApiError::Conflict(v) => (
        StatusCode::CONFLICT,
        json!({ "error": v.to_string(), "fields": { (v.field.as_str()): [v.to_string()] } }),
      ),
      ApiError::Validation(errors) => (
        StatusCode::UNPROCESSABLE_ENTITY,
        json!({ "error": "The given data was invalid.", "fields": errors.messages() }),
      ),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store error");
        (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": e.to_string() }))
      }
    };
    (status, Json(body)).into_response()
  }
}
