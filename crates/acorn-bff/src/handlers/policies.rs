//! Customer policies and the items insured under them.

use acorn_core::{
  policy::{NewDevice, NewPolicy, NewVehicle, Policy},
  upstream::ClaimsUpstream,
};
use axum::{Json, extract::State, http::StatusCode};
use serde_json::Value;

use super::{PolicyPath, UserPath};
use crate::{
  AppState,
  auth::Authenticated,
  error::{Error, OnUpstreamError, UpstreamResultExt as _},
  extract::{ApiJson, ApiPath},
};

const LIST_FAILED: OnUpstreamError = OnUpstreamError::generic("Error fetching policies");
const CREATE_FAILED: OnUpstreamError = OnUpstreamError::generic("Error creating policy");
const GET_FAILED: OnUpstreamError = OnUpstreamError::generic("Error fetching policy");
const VEHICLE_FAILED: OnUpstreamError = OnUpstreamError::generic("Error adding vehicle");
const DEVICE_FAILED: OnUpstreamError = OnUpstreamError::detailed("Error adding device");

/// `GET /api/users/{uid}/policies`
pub async fn list<U: ClaimsUpstream>(
  ApiPath(path): ApiPath<UserPath>,
  Authenticated(token): Authenticated,
  State(state): State<AppState<U>>,
) -> Result<Json<Vec<Policy>>, Error> {
  let policies = state
    .upstream
    .list_policies(&token, path.uid)
    .await
    .or_report(LIST_FAILED)?;
  Ok(Json(policies))
}

/// `POST /api/users/{uid}/policies`
pub async fn create<U: ClaimsUpstream>(
  ApiPath(path): ApiPath<UserPath>,
  Authenticated(token): Authenticated,
  State(state): State<AppState<U>>,
  ApiJson(policy): ApiJson<NewPolicy>,
) -> Result<Json<Value>, Error> {
  let ack = state
    .upstream
    .create_policy(&token, path.uid, &policy)
    .await
    .or_report(CREATE_FAILED)?;
  tracing::info!(user = path.uid, kind = %policy.kind, "policy created");
  Ok(Json(ack))
}

/// `GET /api/users/{uid}/policies/{pnum}`
pub async fn get<U: ClaimsUpstream>(
  ApiPath(path): ApiPath<PolicyPath>,
  Authenticated(token): Authenticated,
  State(state): State<AppState<U>>,
) -> Result<Json<Policy>, Error> {
  let policy = state
    .upstream
    .get_policy(&token, path.uid, &path.pnum)
    .await
    .or_report(GET_FAILED)?;
  Ok(Json(policy))
}

/// `POST /api/users/{uid}/policies/{pnum}/vehicles`
pub async fn add_vehicle<U: ClaimsUpstream>(
  ApiPath(path): ApiPath<PolicyPath>,
  Authenticated(token): Authenticated,
  State(state): State<AppState<U>>,
  ApiJson(vehicle): ApiJson<NewVehicle>,
) -> Result<Json<Value>, Error> {
  let ack = state
    .upstream
    .add_vehicle(&token, path.uid, &path.pnum, &vehicle)
    .await
    .or_report(VEHICLE_FAILED)?;
  Ok(Json(ack))
}

/// `POST /api/users/{uid}/policies/{pnum}/devices`. Answers 201.
pub async fn add_device<U: ClaimsUpstream>(
  ApiPath(path): ApiPath<PolicyPath>,
  Authenticated(token): Authenticated,
  State(state): State<AppState<U>>,
  ApiJson(device): ApiJson<NewDevice>,
) -> Result<(StatusCode, Json<Value>), Error> {
  let ack = state
    .upstream
    .add_device(&token, path.uid, &path.pnum, &device)
    .await
    .or_report(DEVICE_FAILED)?;
  Ok((StatusCode::CREATED, Json(ack)))
}
