//! Users and the login/sign-up payloads that concern them.

use serde::{Deserialize, Serialize};

use crate::token::BearerToken;

/// A portal user as returned by the upstream API.
///
/// The agent API's policy-holder view omits `id`, hence the option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub id:         Option<i64>,
  pub first_name: String,
  pub last_name:  String,
  #[serde(default)]
  pub phone:      Option<String>,
  #[serde(default)]
  pub email:      Option<String>,
  pub username:   String,
}

/// Sign-up payload, forwarded to `POST /users/` unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
  pub first_name: String,
  pub last_name:  String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub phone:      Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub email:      Option<String>,
  pub username:   String,
  pub password:   String,
}

/// Username/password pair accepted by both login endpoints.
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
  pub username: String,
  pub password: String,
}

impl std::fmt::Debug for Credentials {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Credentials")
      .field("username", &self.username)
      .finish_non_exhaustive()
  }
}

/// Body of a successful agent login (`POST /login`).
#[derive(Debug, Clone, Deserialize)]
pub struct AgentGrant {
  pub access_token: BearerToken,
}

/// Body of a successful customer login (`POST /users/login`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerSession {
  pub access_token: BearerToken,
  pub user:         User,
}
