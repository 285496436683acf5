use acorn_core::upstream::{ClaimsUpstream, FeatureFlags};
use axum::{Json, extract::State};

use crate::{
  AppState,
  error::{Error, OnUpstreamError, UpstreamResultExt as _},
};

const FEATURES_FAILED: OnUpstreamError = OnUpstreamError::generic("Error fetching features");

/// `GET /api/system/features`. No token needed.
pub async fn features<U: ClaimsUpstream>(
  State(state): State<AppState<U>>,
) -> Result<Json<FeatureFlags>, Error> {
  let flags = state.upstream.features().await.or_report(FEATURES_FAILED)?;
  Ok(Json(flags))
}

pub async fn healthz() -> &'static str { "ok" }
