//! Error types for `acorn-core`.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
  /// The path carried no usable policy number. Browser callers send the
  /// literal string `undefined` before they have resolved one.
  #[error("Policy number is required")]
  MissingPolicyNumber,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
