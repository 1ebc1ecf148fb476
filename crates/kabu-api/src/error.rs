//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::{JsonRejection, QueryRejection},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use kabu_core::{ErrorKind, StoreError};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  /// Reported to the client as `message` only; the source is logged.
  #[error("{message}")]
  Internal {
    message: &'static str,
    #[source]
    source:  Box<dyn std::error::Error + Send + Sync>,
  },
}

impl ApiError {
  /// Classify a store error. `message` is what the client sees if the error
  /// turns out to be internal.
  pub fn store<E: StoreError>(message: &'static str) -> impl FnOnce(E) -> Self {
    move |e| match e.kind() {
      ErrorKind::NotFound => ApiError::NotFound(e.to_string()),
      ErrorKind::Invalid => ApiError::BadRequest(e.to_string()),
      ErrorKind::Internal => ApiError::Internal { message, source: Box::new(e) },
    }
  }

  pub fn missing_param(name: &str) -> Self {
    ApiError::BadRequest(format!("missing required query parameter `{name}`"))
  }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self { ApiError::BadRequest(rejection.body_text()) }
}

impl From<QueryRejection> for ApiError {
  fn from(rejection: QueryRejection) -> Self { ApiError::BadRequest(rejection.body_text()) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Internal { message, source } => {
        tracing::error!(error = %error_chain(source.as_ref()), "{message}");
        (StatusCode::INTERNAL_SERVER_ERROR, (*message).to_owned())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}

/// `outer: inner: innermost`
fn error_chain(e: &(dyn std::error::Error + 'static)) -> String {
  let mut out = e.to_string();
  let mut cur = e.source();
  while let Some(inner) = cur {
    out.push_str(": ");
    out.push_str(&inner.to_string());
    cur = inner.source();
  }
  out
}
