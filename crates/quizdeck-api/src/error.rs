//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use quizdeck_core::Error as DomainError;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  /// Missing, malformed, expired, or unknown bearer token.
  #[error("unauthorized")]
  Unauthorized,

  #[error(transparent)]
  Domain(#[from] DomainError),
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::Unauthorized => {
        (StatusCode::UNAUTHORIZED, "unauthorized".to_owned())
      }
      ApiError::Domain(e) => (status_for(e), e.to_string()),
    };

    if status == StatusCode::INTERNAL_SERVER_ERROR {
      tracing::error!(error = %self, "internal error serving request");
    }
    (status, Json(json!({ "error": message }))).into_response()
  }
}

fn status_for(e: &DomainError) -> StatusCode {
  match e {
    DomainError::BoardNotFound(_)
    | DomainError::SessionNotFound(_)
    | DomainError::QuestionNotFound(_)
    | DomainError::PlayerNotFound(_) => StatusCode::NOT_FOUND,
    DomainError::NotSessionOwner { .. } => StatusCode::FORBIDDEN,
    DomainError::AlreadyAnswered { .. }
    | DomainError::DuplicateTopic(_)
    | DomainError::Validation(_) => StatusCode::BAD_REQUEST,
    DomainError::Generation(_)
    | DomainError::Serialization(_)
    | DomainError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
  }
}
