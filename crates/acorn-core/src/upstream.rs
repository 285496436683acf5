//! The `ClaimsUpstream` trait, the data-access boundary of the BFF.
//!
//! The trait is implemented by `acorn-upstream` over HTTP. The BFF routes
//! depend on this abstraction, not on the concrete client, so they can be
//! exercised against in-memory fakes.

use std::future::Future;

use serde_json::{Map, Value};

use crate::{
  claim::{Check, Claim, ClaimPolicy, ClaimUpdate, NewClaim},
  policy::{NewDevice, NewPolicy, NewVehicle, Policy, PolicyNumber},
  token::BearerToken,
  user::{Credentials, CustomerSession, NewUser, User},
};

/// Feature flags published by the upstream. Opaque to the BFF.
pub type FeatureFlags = Map<String, Value>;

/// What the BFF needs to know about a failed upstream call in order to map
/// it onto its error envelope.
pub trait UpstreamFailure: std::error::Error + Send + Sync + 'static {
  /// The HTTP status the upstream answered with, if it answered at all.
  fn status(&self) -> Option<u16>;

  /// The upstream's error body, if it sent one.
  fn body(&self) -> Option<&Value>;
}

/// Abstraction over the upstream claims/policy API.
///
/// Every method performs exactly one upstream call. Nothing is retried.
/// All methods return `Send` futures so implementations can be shared across
/// axum handlers.
pub trait ClaimsUpstream: Send + Sync {
  type Error: UpstreamFailure;

  // ── Sessions ──────────────────────────────────────────────────────────

  /// `POST /login`: agent login. Yields the issued token.
  fn login_agent<'a>(
    &'a self,
    credentials: &'a Credentials,
  ) -> impl Future<Output = Result<BearerToken, Self::Error>> + Send + 'a;

  /// `POST /users/login`: customer login. Yields the token and the user.
  fn login_customer<'a>(
    &'a self,
    credentials: &'a Credentials,
  ) -> impl Future<Output = Result<CustomerSession, Self::Error>> + Send + 'a;

  /// `POST /users/`: sign-up. Unauthenticated.
  fn create_user<'a>(
    &'a self,
    user: &'a NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + 'a;

  // ── Agent claim review ────────────────────────────────────────────────

  /// `GET /claims[?status=...]`
  fn list_claims<'a>(
    &'a self,
    token: &'a BearerToken,
    status: Option<&'a str>,
  ) -> impl Future<Output = Result<Vec<Claim>, Self::Error>> + Send + 'a;

  /// `GET /claims/:id`
  fn get_claim<'a>(
    &'a self,
    token: &'a BearerToken,
    claim_id: i64,
  ) -> impl Future<Output = Result<Claim, Self::Error>> + Send + 'a;

  /// `PUT /claims/:id`
  fn update_claim<'a>(
    &'a self,
    token: &'a BearerToken,
    claim_id: i64,
    update: &'a ClaimUpdate,
  ) -> impl Future<Output = Result<Claim, Self::Error>> + Send + 'a;

  /// `GET /claims/:id/checks`
  fn list_checks<'a>(
    &'a self,
    token: &'a BearerToken,
    claim_id: i64,
  ) -> impl Future<Output = Result<Vec<Check>, Self::Error>> + Send + 'a;

  /// `GET /claims/:id/policy`
  fn get_claim_policy<'a>(
    &'a self,
    token: &'a BearerToken,
    claim_id: i64,
  ) -> impl Future<Output = Result<ClaimPolicy, Self::Error>> + Send + 'a;

  // ── Customer policies ─────────────────────────────────────────────────

  /// `GET /users/:id/policies`
  fn list_policies<'a>(
    &'a self,
    token: &'a BearerToken,
    user_id: i64,
  ) -> impl Future<Output = Result<Vec<Policy>, Self::Error>> + Send + 'a;

  /// `POST /users/:id/policies`. The upstream answers with an
  /// acknowledgement body, relayed as-is.
  fn create_policy<'a>(
    &'a self,
    token: &'a BearerToken,
    user_id: i64,
    policy: &'a NewPolicy,
  ) -> impl Future<Output = Result<Value, Self::Error>> + Send + 'a;

  /// `GET /users/:uid/policies/:pnum`
  fn get_policy<'a>(
    &'a self,
    token: &'a BearerToken,
    user_id: i64,
    policy_number: &'a PolicyNumber,
  ) -> impl Future<Output = Result<Policy, Self::Error>> + Send + 'a;

  /// `POST /users/:uid/policies/:pnum/vehicles`
  fn add_vehicle<'a>(
    &'a self,
    token: &'a BearerToken,
    user_id: i64,
    policy_number: &'a PolicyNumber,
    vehicle: &'a NewVehicle,
  ) -> impl Future<Output = Result<Value, Self::Error>> + Send + 'a;

  /// `POST /users/:uid/policies/:pnum/devices`
  fn add_device<'a>(
    &'a self,
    token: &'a BearerToken,
    user_id: i64,
    policy_number: &'a PolicyNumber,
    device: &'a NewDevice,
  ) -> impl Future<Output = Result<Value, Self::Error>> + Send + 'a;

  // ── Customer claims ───────────────────────────────────────────────────

  /// `GET /users/:uid/policies/:pnum/claims`
  fn list_policy_claims<'a>(
    &'a self,
    token: &'a BearerToken,
    user_id: i64,
    policy_number: &'a PolicyNumber,
  ) -> impl Future<Output = Result<Vec<Claim>, Self::Error>> + Send + 'a;

  /// `POST /users/:uid/policies/:pnum/claims` as `multipart/form-data`.
  ///
  /// The invoice is read from `claim.invoice.path`; the caller owns the file
  /// and removes it once this future resolves.
  fn create_claim<'a>(
    &'a self,
    token: &'a BearerToken,
    user_id: i64,
    policy_number: &'a PolicyNumber,
    claim: &'a NewClaim,
  ) -> impl Future<Output = Result<Claim, Self::Error>> + Send + 'a;

  // ── System ────────────────────────────────────────────────────────────

  /// `GET /system/features`. The only unauthenticated read.
  fn features(
    &self,
  ) -> impl Future<Output = Result<FeatureFlags, Self::Error>> + Send + '_;
}
