//! Bearer tokens: opaque credentials relayed to the upstream API.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An opaque bearer credential issued by the upstream login endpoints.
///
/// The BFF never inspects or verifies the token; it only carries it from the
/// browser's `Authorization` header to the upstream request. `Debug` is
/// redacted so tokens never end up in logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BearerToken(String);

impl BearerToken {
  pub fn new(token: impl Into<String>) -> Self { Self(token.into()) }

  /// Parse the value of an `Authorization` header.
  ///
  /// Accepts exactly `<scheme> <credential>` where the scheme is `Bearer`
  /// (case-insensitive). Anything else yields `None`.
  pub fn from_authorization(header: &str) -> Option<Self> {
    let mut parts = header.split_whitespace();
    let scheme = parts.next()?;
    let credential = parts.next()?;
    if parts.next().is_some() || !scheme.eq_ignore_ascii_case("bearer") {
      return None;
    }
    Some(Self(credential.to_owned()))
  }

  pub fn as_str(&self) -> &str { &self.0 }

  /// The header value to send upstream: `Bearer <token>`.
  pub fn to_header_value(&self) -> String { format!("Bearer {}", self.0) }
}

impl fmt::Debug for BearerToken {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("BearerToken(..)")
  }
}
