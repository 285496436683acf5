//! Login and sign-up. The only routes that do not need a bearer token,
//! apart from the feature flags.

use acorn_core::{
  token::BearerToken,
  upstream::ClaimsUpstream,
  user::{Credentials, CustomerSession, NewUser, User},
};
use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;

use super::Acknowledged;
use crate::{
  AppState,
  error::{Error, OnUpstreamError, UpstreamResultExt as _},
  extract::ApiJson,
};

const LOGIN_FAILED: OnUpstreamError = OnUpstreamError::generic("Login failed");
const SIGNIN_FAILED: OnUpstreamError =
  OnUpstreamError::generic("Invalid username or password").with_status(StatusCode::UNAUTHORIZED);
const SIGNUP_FAILED: OnUpstreamError = OnUpstreamError::detailed("Error creating user");

#[derive(Debug, Serialize)]
pub struct AgentLogin {
  pub token: BearerToken,
  pub user:  String,
}

/// `POST /api/login` (agent portal).
///
/// The token is handed straight back to the caller; nothing is kept.
pub async fn agent_login<U: ClaimsUpstream>(
  State(state): State<AppState<U>>,
  ApiJson(credentials): ApiJson<Credentials>,
) -> Result<Json<AgentLogin>, Error> {
  let token = state.upstream.login_agent(&credentials).await.or_report(LOGIN_FAILED)?;
  tracing::info!(user = %credentials.username, "agent logged in");
  Ok(Json(AgentLogin { token, user: credentials.username }))
}

/// `POST /api/signin` (customer portal).
pub async fn customer_signin<U: ClaimsUpstream>(
  State(state): State<AppState<U>>,
  ApiJson(credentials): ApiJson<Credentials>,
) -> Result<Json<CustomerSession>, Error> {
  let session = state
    .upstream
    .login_customer(&credentials)
    .await
    .or_report(SIGNIN_FAILED)?;
  tracing::info!(user = %credentials.username, "customer signed in");
  Ok(Json(session))
}

/// `POST /api/signup` (customer portal).
pub async fn signup<U: ClaimsUpstream>(
  State(state): State<AppState<U>>,
  ApiJson(user): ApiJson<NewUser>,
) -> Result<Json<Acknowledged<User>>, Error> {
  let created = state.upstream.create_user(&user).await.or_report(SIGNUP_FAILED)?;
  Ok(Json(Acknowledged::new("User created successfully", created)))
}
