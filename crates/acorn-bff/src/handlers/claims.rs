//! Agent claim review. Every route relays the caller's token and hides the
//! upstream failure behind a fixed message.

use acorn_core::{
  claim::{Check, Claim, ClaimPolicy, ClaimUpdate},
  upstream::ClaimsUpstream,
};
use axum::{Json, extract::State};
use serde::Deserialize;

use crate::{
  AppState,
  auth::Authenticated,
  error::{Error, OnUpstreamError, UpstreamResultExt as _},
  extract::{ApiJson, ApiPath, ApiQuery},
};

const LIST_FAILED: OnUpstreamError = OnUpstreamError::generic("Error fetching claims");
const GET_FAILED: OnUpstreamError = OnUpstreamError::generic("Error getting claim");
const UPDATE_FAILED: OnUpstreamError = OnUpstreamError::generic("Error updating claim");
const CHECKS_FAILED: OnUpstreamError = OnUpstreamError::generic("Error fetching checks");
const POLICY_FAILED: OnUpstreamError = OnUpstreamError::generic("Error fetching policy");

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
  pub status: Option<String>,
}

/// `GET /api/claims[?status=]`
///
/// The filter is forwarded as given; a status nobody uses matches nothing.
pub async fn list<U: ClaimsUpstream>(
  Authenticated(token): Authenticated,
  State(state): State<AppState<U>>,
  ApiQuery(query): ApiQuery<ListQuery>,
) -> Result<Json<Vec<Claim>>, Error> {
  let claims = state
    .upstream
    .list_claims(&token, query.status.as_deref())
    .await
    .or_report(LIST_FAILED)?;
  Ok(Json(claims))
}

/// `GET /api/claims/{id}`
pub async fn get<U: ClaimsUpstream>(
  ApiPath(id): ApiPath<i64>,
  Authenticated(token): Authenticated,
  State(state): State<AppState<U>>,
) -> Result<Json<Claim>, Error> {
  let claim = state.upstream.get_claim(&token, id).await.or_report(GET_FAILED)?;
  Ok(Json(claim))
}

/// `PUT /api/claims/{id}`
pub async fn update<U: ClaimsUpstream>(
  ApiPath(id): ApiPath<i64>,
  Authenticated(token): Authenticated,
  State(state): State<AppState<U>>,
  ApiJson(update): ApiJson<ClaimUpdate>,
) -> Result<Json<Claim>, Error> {
  let claim = state
    .upstream
    .update_claim(&token, id, &update)
    .await
    .or_report(UPDATE_FAILED)?;
  tracing::info!(
    claim = id,
    status = ?update.status(),
    internal_status = ?update.internal_status(),
    fields = update.0.len(),
    "claim updated"
  );
  Ok(Json(claim))
}

/// `GET /api/claims/{id}/checks`
pub async fn checks<U: ClaimsUpstream>(
  ApiPath(id): ApiPath<i64>,
  Authenticated(token): Authenticated,
  State(state): State<AppState<U>>,
) -> Result<Json<Vec<Check>>, Error> {
  let checks = state.upstream.list_checks(&token, id).await.or_report(CHECKS_FAILED)?;
  Ok(Json(checks))
}

/// `GET /api/claims/{id}/policy`
pub async fn policy<U: ClaimsUpstream>(
  ApiPath(id): ApiPath<i64>,
  Authenticated(token): Authenticated,
  State(state): State<AppState<U>>,
) -> Result<Json<ClaimPolicy>, Error> {
  let policy = state
    .upstream
    .get_claim_policy(&token, id)
    .await
    .or_report(POLICY_FAILED)?;
  Ok(Json(policy))
}
