//! Claims filed by customers against their policies.

use acorn_core::{
  claim::Claim,
  policy::PolicyNumber,
  upstream::ClaimsUpstream,
};
use axum::{
  Json,
  extract::{Multipart, State, multipart::MultipartRejection},
};
use futures::future::try_join_all;

use super::{Acknowledged, PolicyPath, UserPath};
use crate::{
  AppState,
  auth::Authenticated,
  error::{Error, OnUpstreamError, UpstreamResultExt as _},
  extract::ApiPath,
  spool::{ClaimForm, FILE_CLAIM_FAILED},
};

const LIST_FAILED: OnUpstreamError = OnUpstreamError::passthrough("Error fetching claims");
const FILE_FAILED: OnUpstreamError = OnUpstreamError::detailed(FILE_CLAIM_FAILED);

/// `GET /api/users/{uid}/policies/{pnum}/claims`
pub async fn list<U: ClaimsUpstream>(
  ApiPath(path): ApiPath<PolicyPath>,
  Authenticated(token): Authenticated,
  State(state): State<AppState<U>>,
) -> Result<Json<Vec<Claim>>, Error> {
  let claims = state
    .upstream
    .list_policy_claims(&token, path.uid, &path.pnum)
    .await
    .or_report(LIST_FAILED)?;
  Ok(Json(claims))
}

/// `POST /api/users/{uid}/policies/{pnum}/claims` (multipart).
///
/// The invoice is spooled under the upload directory and removed once the
/// upstream call has finished, whatever its outcome.
pub async fn create<U: ClaimsUpstream>(
  ApiPath(path): ApiPath<PolicyPath>,
  Authenticated(token): Authenticated,
  State(state): State<AppState<U>>,
  multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Acknowledged<Claim>>, Error> {
  let form = ClaimForm::read(multipart?, &state.config.upload_dir).await?;
  let (_spooled, claim) = form.into_claim()?;

  let filed = state
    .upstream
    .create_claim(&token, path.uid, &path.pnum, &claim)
    .await
    .or_report(FILE_FAILED)?;
  tracing::info!(user = path.uid, policy = %path.pnum, claim = filed.id, "claim filed");
  Ok(Json(Acknowledged::new("Claim filed successfully", filed)))
}

/// `GET /api/users/{uid}/claims`
///
/// Every claim across the user's policies, in policy order. The per-policy
/// fetches run concurrently and the first failure fails the whole request.
pub async fn aggregate<U: ClaimsUpstream>(
  ApiPath(path): ApiPath<UserPath>,
  Authenticated(token): Authenticated,
  State(state): State<AppState<U>>,
) -> Result<Json<Vec<Claim>>, Error> {
  let policies = state
    .upstream
    .list_policies(&token, path.uid)
    .await
    .or_report(LIST_FAILED)?;

  let numbers: Vec<PolicyNumber> = policies
    .into_iter()
    .filter_map(|policy| match policy.policy_number.parse::<PolicyNumber>() {
      Ok(number) => {
        tracing::debug!(
          policy = %number,
          kind = %policy.kind(),
          complete = policy.coverage.is_complete(),
          "collecting claims"
        );
        Some(number)
      }
      Err(e) => {
        tracing::warn!(policy = policy.id, error = %e, "skipping policy without a number");
        None
      }
    })
    .collect();

  let per_policy = try_join_all(
    numbers
      .iter()
      .map(|number| state.upstream.list_policy_claims(&token, path.uid, number)),
  )
  .await
  .or_report(LIST_FAILED)?;

  Ok(Json(per_policy.into_iter().flatten().collect()))
}
