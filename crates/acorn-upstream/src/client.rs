//! [`HttpUpstream`]: the reqwest implementation of [`ClaimsUpstream`].

use std::time::Duration;

use acorn_core::{
  claim::{Check, Claim, ClaimPolicy, ClaimUpdate, NewClaim},
  policy::{NewDevice, NewPolicy, NewVehicle, Policy, PolicyNumber},
  token::BearerToken,
  upstream::{ClaimsUpstream, FeatureFlags},
  user::{AgentGrant, Credentials, CustomerSession, NewUser, User},
};
use reqwest::{Client, RequestBuilder, Url, header};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{Error, Result, form::claim_form};

// ─── Client ──────────────────────────────────────────────────────────────────

/// Async HTTP client for the upstream claims API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based. Holds no
/// credentials of its own; every authenticated call takes the caller's
/// token.
#[derive(Clone)]
pub struct HttpUpstream {
  client:   Client,
  base_url: Url,
}

impl HttpUpstream {
  /// Build a client for the API rooted at `base_url`.
  pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
    let base_url =
      Url::parse(base_url).map_err(|_| Error::BaseUrl(base_url.to_owned()))?;
    if base_url.cannot_be_a_base() {
      return Err(Error::BaseUrl(base_url.to_string()));
    }
    let client = Client::builder().timeout(timeout).build()?;
    Ok(Self { client, base_url })
  }

  pub fn base_url(&self) -> &Url { &self.base_url }

  /// Append percent-encoded path segments to the base URL.
  fn url(&self, segments: &[&str]) -> Url {
    let mut url = self.base_url.clone();
    if let Ok(mut path) = url.path_segments_mut() {
      path.pop_if_empty().extend(segments);
    }
    url
  }

  fn authed(&self, req: RequestBuilder, token: &BearerToken) -> RequestBuilder {
    req.header(header::AUTHORIZATION, token.to_header_value())
  }

  /// Send `req` and decode a 2xx JSON body as `T`.
  ///
  /// Non-2xx answers become [`Error::Status`] carrying the upstream body,
  /// decoded as JSON when possible and as a string otherwise.
  async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T> {
    let resp = req.send().await?;
    let status = resp.status();
    let url = resp.url().path().to_owned();
    let bytes = resp.bytes().await?;

    if !status.is_success() {
      let body = serde_json::from_slice(&bytes).unwrap_or_else(|_| {
        Value::String(String::from_utf8_lossy(&bytes).into_owned())
      });
      tracing::debug!(%status, path = %url, "upstream rejected request");
      return Err(Error::Status { status: status.as_u16(), body });
    }

    tracing::debug!(%status, path = %url, "upstream request succeeded");
    Ok(serde_json::from_slice(&bytes)?)
  }
}

// ─── Trait impl ──────────────────────────────────────────────────────────────

impl ClaimsUpstream for HttpUpstream {
  type Error = Error;

  // ── Sessions ──────────────────────────────────────────────────────────────

  async fn login_agent<'a>(&'a self, credentials: &'a Credentials) -> Result<BearerToken> {
    let grant: AgentGrant = self
      .send(self.client.post(self.url(&["login"])).json(credentials))
      .await?;
    Ok(grant.access_token)
  }

  async fn login_customer<'a>(
    &'a self,
    credentials: &'a Credentials,
  ) -> Result<CustomerSession> {
    self
      .send(self.client.post(self.url(&["users", "login"])).json(credentials))
      .await
  }

  async fn create_user<'a>(&'a self, user: &'a NewUser) -> Result<User> {
    // The trailing empty segment keeps the upstream's `/users/` route.
    self
      .send(self.client.post(self.url(&["users", ""])).json(user))
      .await
  }

  // ── Agent claim review ────────────────────────────────────────────────────

  async fn list_claims<'a>(
    &'a self,
    token: &'a BearerToken,
    status: Option<&'a str>,
  ) -> Result<Vec<Claim>> {
    let mut req = self.client.get(self.url(&["claims"]));
    if let Some(status) = status {
      req = req.query(&[("status", status)]);
    }
    self.send(self.authed(req, token)).await
  }

  async fn get_claim<'a>(&'a self, token: &'a BearerToken, claim_id: i64) -> Result<Claim> {
    let id = claim_id.to_string();
    let req = self.client.get(self.url(&["claims", &id]));
    self.send(self.authed(req, token)).await
  }

  async fn update_claim<'a>(
    &'a self,
    token: &'a BearerToken,
    claim_id: i64,
    update: &'a ClaimUpdate,
  ) -> Result<Claim> {
    let id = claim_id.to_string();
    let req = self.client.put(self.url(&["claims", &id])).json(update);
    self.send(self.authed(req, token)).await
  }

  async fn list_checks<'a>(
    &'a self,
    token: &'a BearerToken,
    claim_id: i64,
  ) -> Result<Vec<Check>> {
    let id = claim_id.to_string();
    let req = self.client.get(self.url(&["claims", &id, "checks"]));
    self.send(self.authed(req, token)).await
  }

  async fn get_claim_policy<'a>(
    &'a self,
    token: &'a BearerToken,
    claim_id: i64,
  ) -> Result<ClaimPolicy> {
    let id = claim_id.to_string();
    let req = self.client.get(self.url(&["claims", &id, "policy"]));
    self.send(self.authed(req, token)).await
  }

  // ── Customer policies ─────────────────────────────────────────────────────

  async fn list_policies<'a>(
    &'a self,
    token: &'a BearerToken,
    user_id: i64,
  ) -> Result<Vec<Policy>> {
    let uid = user_id.to_string();
    let req = self.client.get(self.url(&["users", &uid, "policies"]));
    self.send(self.authed(req, token)).await
  }

  async fn create_policy<'a>(
    &'a self,
    token: &'a BearerToken,
    user_id: i64,
    policy: &'a NewPolicy,
  ) -> Result<Value> {
    let uid = user_id.to_string();
    let req = self
      .client
      .post(self.url(&["users", &uid, "policies"]))
      .json(policy);
    self.send(self.authed(req, token)).await
  }

  async fn get_policy<'a>(
    &'a self,
    token: &'a BearerToken,
    user_id: i64,
    policy_number: &'a PolicyNumber,
  ) -> Result<Policy> {
    let uid = user_id.to_string();
    let req = self
      .client
      .get(self.url(&["users", &uid, "policies", policy_number.as_str()]));
    self.send(self.authed(req, token)).await
  }

  async fn add_vehicle<'a>(
    &'a self,
    token: &'a BearerToken,
    user_id: i64,
    policy_number: &'a PolicyNumber,
    vehicle: &'a NewVehicle,
  ) -> Result<Value> {
    let uid = user_id.to_string();
    let req = self
      .client
      .post(self.url(&["users", &uid, "policies", policy_number.as_str(), "vehicles"]))
      .json(vehicle);
    self.send(self.authed(req, token)).await
  }

  async fn add_device<'a>(
    &'a self,
    token: &'a BearerToken,
    user_id: i64,
    policy_number: &'a PolicyNumber,
    device: &'a NewDevice,
  ) -> Result<Value> {
    let uid = user_id.to_string();
    let req = self
      .client
      .post(self.url(&["users", &uid, "policies", policy_number.as_str(), "devices"]))
      .json(device);
    self.send(self.authed(req, token)).await
  }

  // ── Customer claims ───────────────────────────────────────────────────────

  async fn list_policy_claims<'a>(
    &'a self,
    token: &'a BearerToken,
    user_id: i64,
    policy_number: &'a PolicyNumber,
  ) -> Result<Vec<Claim>> {
    let uid = user_id.to_string();
    let req = self
      .client
      .get(self.url(&["users", &uid, "policies", policy_number.as_str(), "claims"]));
    self.send(self.authed(req, token)).await
  }

  async fn create_claim<'a>(
    &'a self,
    token: &'a BearerToken,
    user_id: i64,
    policy_number: &'a PolicyNumber,
    claim: &'a NewClaim,
  ) -> Result<Claim> {
    let uid = user_id.to_string();
    let form = claim_form(claim).await?;
    let req = self
      .client
      .post(self.url(&["users", &uid, "policies", policy_number.as_str(), "claims"]))
      .multipart(form);
    self.send(self.authed(req, token)).await
  }

  // ── System ────────────────────────────────────────────────────────────────

  async fn features(&self) -> Result<FeatureFlags> {
    self
      .send(self.client.get(self.url(&["system", "features"])))
      .await
  }
}
