pub mod claims;
pub mod policies;
pub mod policy_claims;
pub mod session;
pub mod system;

use acorn_core::policy::PolicyNumber;
use serde::{Deserialize, Serialize};

/// `{message, data}` acknowledgement used by the create routes.
#[derive(Debug, Serialize)]
pub struct Acknowledged<T> {
  message: &'static str,
  data:    T,
}

impl<T> Acknowledged<T> {
  pub fn new(message: &'static str, data: T) -> Self { Self { message, data } }
}

/// `/api/users/{uid}/...`
#[derive(Debug, Deserialize)]
pub struct UserPath {
  pub uid: i64,
}

/// `/api/users/{uid}/policies/{pnum}/...`
#[derive(Debug, Deserialize)]
pub struct PolicyPath {
  pub uid:  i64,
  pub pnum: PolicyNumber,
}
