//! Error types and the JSON error envelope.
//!
//! Every failure leaves the BFF as `{"message": ..., "error"?: ...}`. Routes
//! pick how an upstream failure is reported with an [`OnUpstreamError`].

use acorn_core::upstream::UpstreamFailure;
use axum::{
  Json,
  extract::rejection::{JsonRejection, PathRejection, QueryRejection},
  extract::path::ErrorKind,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("missing or malformed bearer token")]
  Unauthenticated,

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("{message}: {source}")]
  Upstream {
    status:  StatusCode,
    message: &'static str,
    error:   Option<Value>,
    #[source]
    source:  Box<dyn std::error::Error + Send + Sync>,
  },

  /// The invoice upload could not be received or spooled.
  #[error("{message}: {detail}")]
  Invoice { message: &'static str, detail: String },
}

/// The body of every error response.
#[derive(Debug, Serialize)]
struct Envelope {
  message: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  error:   Option<Value>,
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let (status, envelope) = match self {
      Error::Unauthenticated => (StatusCode::UNAUTHORIZED, Envelope {
        message: "Missing or malformed bearer token".to_owned(),
        error:   None,
      }),
      Error::BadRequest(message) => {
        (StatusCode::BAD_REQUEST, Envelope { message, error: None })
      }
      Error::Upstream { status, message, error, source } => {
        tracing::error!(%status, error = %source, "{message}");
        (status, Envelope { message: message.to_owned(), error })
      }
      Error::Invoice { message, detail } => {
        tracing::error!(error = %detail, "{message}");
        (StatusCode::INTERNAL_SERVER_ERROR, Envelope {
          message: message.to_owned(),
          error:   Some(Value::String(detail)),
        })
      }
    };
    (status, Json(envelope)).into_response()
  }
}

// ─── Upstream failure mapping ────────────────────────────────────────────────

/// How a route reports a failed upstream call.
#[derive(Debug, Clone, Copy)]
pub struct OnUpstreamError {
  message: &'static str,
  /// `None` relays the upstream's own status.
  status:  Option<StatusCode>,
  /// Attach the upstream body (or the error text) as `error`.
  detail:  bool,
}

impl OnUpstreamError {
  /// 500 with only the route's message.
  pub const fn generic(message: &'static str) -> Self {
    Self { message, status: Some(StatusCode::INTERNAL_SERVER_ERROR), detail: false }
  }

  /// 500 with the message and the upstream's error detail.
  pub const fn detailed(message: &'static str) -> Self {
    Self { message, status: Some(StatusCode::INTERNAL_SERVER_ERROR), detail: true }
  }

  /// The upstream's status (500 if it never answered) with the detail.
  pub const fn passthrough(message: &'static str) -> Self {
    Self { message, status: None, detail: true }
  }

  pub const fn with_status(self, status: StatusCode) -> Self {
    Self { status: Some(status), ..self }
  }

  pub fn wrap<E: UpstreamFailure>(self, err: E) -> Error {
    let status = self.status.unwrap_or_else(|| {
      err
        .status()
        .and_then(|s| StatusCode::from_u16(s).ok())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    });
    let error = self.detail.then(|| {
      err
        .body()
        .cloned()
        .unwrap_or_else(|| Value::String(err.to_string()))
    });
    Error::Upstream { status, message: self.message, error, source: Box::new(err) }
  }
}

/// Adapter so handlers can write `.or_report(ON_ERROR)?` on upstream results.
pub trait UpstreamResultExt<T> {
  fn or_report(self, on_error: OnUpstreamError) -> Result<T, Error>;
}

impl<T, E: UpstreamFailure> UpstreamResultExt<T> for Result<T, E> {
  fn or_report(self, on_error: OnUpstreamError) -> Result<T, Error> {
    self.map_err(|e| on_error.wrap(e))
  }
}

// ─── Extractor rejections ────────────────────────────────────────────────────

impl From<JsonRejection> for Error {
  fn from(rejection: JsonRejection) -> Self { Error::BadRequest(rejection.body_text()) }
}

impl From<QueryRejection> for Error {
  fn from(rejection: QueryRejection) -> Self { Error::BadRequest(rejection.body_text()) }
}

impl From<PathRejection> for Error {
  fn from(rejection: PathRejection) -> Self {
    // Custom messages come from value types such as `PolicyNumber`; report
    // them verbatim.
    if let PathRejection::FailedToDeserializePathParams(inner) = &rejection
      && let ErrorKind::Message(message) = inner.kind()
    {
      return Error::BadRequest(message.clone());
    }
    Error::BadRequest(format!("Invalid path parameter: {}", rejection.body_text()))
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[derive(Debug, Error)]
  #[error("upstream said no")]
  struct Refused {
    status: Option<u16>,
    body:   Option<Value>,
  }

  impl UpstreamFailure for Refused {
    fn status(&self) -> Option<u16> { self.status }
    fn body(&self) -> Option<&Value> { self.body.as_ref() }
  }

  async fn render(err: Error) -> (StatusCode, Value) {
    let resp = err.into_response();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
  }

  #[tokio::test]
  async fn generic_hides_upstream_detail() {
    let err = OnUpstreamError::generic("Error fetching claims").wrap(Refused {
      status: Some(403),
      body:   Some(json!({ "message": "Admins only" })),
    });
    let (status, body) = render(err).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "message": "Error fetching claims" }));
  }

  #[tokio::test]
  async fn passthrough_relays_status_and_body() {
    let err = OnUpstreamError::passthrough("Error fetching claims").wrap(Refused {
      status: Some(404),
      body:   Some(json!({ "message": "Policy not found or access forbidden" })),
    });
    let (status, body) = render(err).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "Policy not found or access forbidden");
  }

  #[tokio::test]
  async fn passthrough_without_answer_is_500_with_error_text() {
    let err = OnUpstreamError::passthrough("Error fetching claims")
      .wrap(Refused { status: None, body: None });
    let (status, body) = render(err).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "upstream said no");
  }

  #[tokio::test]
  async fn unauthenticated_is_401_envelope() {
    let (status, body) = render(Error::Unauthenticated).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Missing or malformed bearer token");
    assert!(body.get("error").is_none());
  }
}
