//! Application error type and its JSON rendering.
//!
//! Every failure leaves the API as `{"message": ...}` with a matching
//! status. Store failures are logged and hidden behind a generic message.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::db::DbLockError;

#[derive(Debug, Error)]
pub enum AppError {
  /// Missing, or owned by someone else
  #[error("{0}")]
  NotFound(String),

  #[error("{0}")]
  Validation(String),

  #[error("{0}")]
  Unauthorized(String),

  #[error("{0}")]
  Conflict(String),

  #[error("database error: {0}")]
  Database(#[from] rusqlite::Error),

  #[error(transparent)]
  Unavailable(#[from] DbLockError),

  #[error("internal error: {0}")]
  Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
  pub fn not_found(message: impl Into<String>) -> Self {
    Self::NotFound(message.into())
  }

  pub fn validation(message: impl Into<String>) -> Self {
    Self::Validation(message.into())
  }

  pub fn status(&self) -> StatusCode {
    match self {
      Self::NotFound(_) => StatusCode::NOT_FOUND,
      Self::Validation(_) => StatusCode::BAD_REQUEST,
      Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
      Self::Conflict(_) => StatusCode::CONFLICT,
      Self::Database(_) | Self::Unavailable(_) | Self::Internal(_) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
    }
  }
}

impl IntoResponse for AppError {
  fn into_response(self) -> Response {
    let status = self.status();
    let message = if status.is_server_error() {
      tracing::error!("{}", self);
      "Internal Server Error".to_string()
    } else {
      self.to_string()
    };
    (status, Json(json!({ "message": message }))).into_response()
  }
}

impl From<JsonRejection> for AppError {
  fn from(rejection: JsonRejection) -> Self {
    Self::Validation(rejection.body_text())
  }
}

impl From<PathRejection> for AppError {
  fn from(rejection: PathRejection) -> Self {
    Self::Validation(rejection.body_text())
  }
}

impl From<QueryRejection> for AppError {
  fn from(rejection: QueryRejection) -> Self {
    Self::Validation(rejection.body_text())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_status_mapping() {
    assert_eq!(AppError::not_found("x").status(), StatusCode::NOT_FOUND);
    assert_eq!(AppError::validation("x").status(), StatusCode::BAD_REQUEST);
    assert_eq!(AppError::Unauthorized("x".into()).status(), StatusCode::UNAUTHORIZED);
    assert_eq!(AppError::Conflict("x".into()).status(), StatusCode::CONFLICT);
    assert_eq!(
      AppError::from(rusqlite::Error::QueryReturnedNoRows).status(),
      StatusCode::INTERNAL_SERVER_ERROR
    );
    assert_eq!(AppError::from(DbLockError).status(), StatusCode::INTERNAL_SERVER_ERROR);
  }

  #[test]
  fn test_client_errors_keep_their_message() {
    let err = AppError::not_found("Không tìm thấy set");
    assert_eq!(err.to_string(), "Không tìm thấy set");
    assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
  }
}
