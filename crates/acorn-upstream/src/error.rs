//! Error type for `acorn-upstream`.

use acorn_core::upstream::UpstreamFailure;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The request never got an HTTP answer (refused, reset, timed out).
  #[error("upstream transport error: {0}")]
  Transport(#[from] reqwest::Error),

  /// The upstream answered with a non-success status.
  #[error("upstream answered {status}: {body}")]
  Status { status: u16, body: Value },

  /// The upstream answered 2xx with a body of the wrong shape.
  #[error("unexpected upstream response body: {0}")]
  Decode(#[from] serde_json::Error),

  #[error("invoice could not be read: {0}")]
  Invoice(#[from] std::io::Error),

  #[error("invalid upstream base url {0:?}")]
  BaseUrl(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl UpstreamFailure for Error {
  fn status(&self) -> Option<u16> {
    match self {
      Error::Status { status, .. } => Some(*status),
      Error::Transport(e) => e.status().map(|s| s.as_u16()),
      _ => None,
    }
  }

  fn body(&self) -> Option<&Value> {
    match self {
      Error::Status { body, .. } => Some(body),
      _ => None,
    }
  }
}
