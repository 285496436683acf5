//! Bearer-token extractor.
//!
//! The BFF does not verify tokens. It only requires that one is present and
//! well-formed, then relays it upstream on the caller's behalf.

use acorn_core::token::BearerToken;
use axum::{
  extract::FromRequestParts,
  http::{header, request::Parts},
};

use crate::error::Error;

/// The caller's bearer token. Present in a handler means the request carried
/// `Authorization: Bearer <token>`.
pub struct Authenticated(pub BearerToken);

impl<S: Send + Sync> FromRequestParts<S> for Authenticated {
  type Rejection = Error;

  async fn from_request_parts(parts: &mut Parts, _: &S) -> Result<Self, Self::Rejection> {
    parts
      .headers
      .get(header::AUTHORIZATION)
      .and_then(|v| v.to_str().ok())
      .and_then(BearerToken::from_authorization)
      .map(Authenticated)
      .ok_or(Error::Unauthenticated)
  }
}

#[cfg(test)]
mod tests {
  use axum::{body::Body, http::Request};

  use super::*;

  async fn extract(req: Request<Body>) -> Result<Authenticated, Error> {
    let (mut parts, _) = req.into_parts();
    Authenticated::from_request_parts(&mut parts, &()).await
  }

  fn with_auth(value: &str) -> Request<Body> {
    Request::builder()
      .header(header::AUTHORIZATION, value)
      .body(Body::empty())
      .unwrap()
  }

  #[tokio::test]
  async fn bearer_token_is_extracted() {
    let Authenticated(token) = extract(with_auth("Bearer abc.def")).await.unwrap();
    assert_eq!(token.as_str(), "abc.def");
  }

  #[tokio::test]
  async fn missing_header() {
    let req = Request::builder().body(Body::empty()).unwrap();
    assert!(matches!(extract(req).await, Err(Error::Unauthenticated)));
  }

  #[tokio::test]
  async fn bare_scheme_without_credential() {
    assert!(matches!(extract(with_auth("Bearer")).await, Err(Error::Unauthenticated)));
  }

  #[tokio::test]
  async fn basic_scheme_rejected() {
    assert!(matches!(
      extract(with_auth("Basic dXNlcjpwYXNz")).await,
      Err(Error::Unauthenticated)
    ));
  }
}
