//! Backend-for-frontend for the Acorn agent and customer portals.
//!
//! Exposes an axum [`Router`] that relays browser requests to the upstream
//! claims API through any [`ClaimsUpstream`], forwarding the caller's bearer
//! token and mapping failures onto a JSON error envelope.

pub mod auth;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod spool;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use acorn_core::upstream::ClaimsUpstream;
use axum::{
  Router,
  extract::{DefaultBodyLimit, Request},
  http::{HeaderName, HeaderValue},
  middleware::{self, Next},
  response::Response,
  routing::{get, post},
};
use serde::Deserialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::Instrument as _;

use handlers::{claims, policies, policy_claims, session, system};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Which portal this instance fronts. Decides the route table and the
/// default upstream.
#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  Deserialize,
  clap::ValueEnum,
  strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Portal {
  Agent,
  #[default]
  Customer,
}

impl Portal {
  /// The upstream each portal talked to before the URL was configurable.
  pub fn legacy_upstream(self) -> &'static str {
    match self {
      Portal::Agent => "http://127.0.0.1:5100",
      Portal::Customer => "http://127.0.0.1:5000",
    }
  }
}

/// Runtime server configuration, deserialised from `config.toml` and
/// `ACORN_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:                  String,
  pub port:                  u16,
  pub portal:                Portal,
  /// Falls back to [`Portal::legacy_upstream`] when unset.
  pub upstream_url:          Option<String>,
  pub upload_dir:            PathBuf,
  pub max_upload_bytes:      usize,
  pub upstream_timeout_secs: u64,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:                  "127.0.0.1".to_owned(),
      port:                  3001,
      portal:                Portal::default(),
      upstream_url:          None,
      upload_dir:            PathBuf::from("uploads"),
      max_upload_bytes:      16 * 1024 * 1024,
      upstream_timeout_secs: 30,
    }
  }
}

impl ServerConfig {
  /// Layer the optional TOML file at `path` under `ACORN_*` variables.
  pub fn load(path: impl Into<PathBuf>) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path.into()).required(false))
      .add_source(config::Environment::with_prefix("ACORN"))
      .build()?
      .try_deserialize()
  }

  pub fn upstream_url(&self) -> &str {
    self.upstream_url.as_deref().unwrap_or(self.portal.legacy_upstream())
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<U> {
  pub upstream: Arc<U>,
  pub config:   Arc<ServerConfig>,
}

impl<U> Clone for AppState<U> {
  fn clone(&self) -> Self {
    Self { upstream: Arc::clone(&self.upstream), config: Arc::clone(&self.config) }
  }
}

impl<U> AppState<U> {
  pub fn new(upstream: U, config: ServerConfig) -> Self {
    Self { upstream: Arc::new(upstream), config: Arc::new(config) }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the axum [`Router`] for the portal named in the state's config.
pub fn router<U>(state: AppState<U>) -> Router
where
  U: ClaimsUpstream + 'static,
{
  let routes = match state.config.portal {
    Portal::Agent => agent_routes::<U>(),
    Portal::Customer => customer_routes::<U>(),
  };

  routes
    .route("/api/system/features", get(system::features::<U>))
    .route("/healthz", get(system::healthz))
    .layer(DefaultBodyLimit::max(state.config.max_upload_bytes))
    .layer(middleware::from_fn(correlation_id))
    .layer(TraceLayer::new_for_http())
    .layer(CorsLayer::permissive())
    .with_state(state)
}

fn agent_routes<U: ClaimsUpstream + 'static>() -> Router<AppState<U>> {
  Router::new()
    .route("/api/login",                 post(session::agent_login::<U>))
    .route("/api/claims",                get(claims::list::<U>))
    .route("/api/claims/{id}",           get(claims::get::<U>).put(claims::update::<U>))
    .route("/api/claims/{id}/checks",    get(claims::checks::<U>))
    .route("/api/claims/{id}/policy",    get(claims::policy::<U>))
}

fn customer_routes<U: ClaimsUpstream + 'static>() -> Router<AppState<U>> {
  Router::new()
    .route("/api/signup",                            post(session::signup::<U>))
    .route("/api/signin",                            post(session::customer_signin::<U>))
    .route("/api/users/{uid}/claims",                get(policy_claims::aggregate::<U>))
    .route(
      "/api/users/{uid}/policies",
      get(policies::list::<U>).post(policies::create::<U>),
    )
    .route("/api/users/{uid}/policies/{pnum}",          get(policies::get::<U>))
    .route("/api/users/{uid}/policies/{pnum}/vehicles", post(policies::add_vehicle::<U>))
    .route("/api/users/{uid}/policies/{pnum}/devices",  post(policies::add_device::<U>))
    .route(
      "/api/users/{uid}/policies/{pnum}/claims",
      get(policy_claims::list::<U>).post(policy_claims::create::<U>),
    )
}

// ─── Middleware ───────────────────────────────────────────────────────────────

pub const CORRELATION_ID: HeaderName = HeaderName::from_static("x-correlation-id");

/// Tag every request with a correlation id, reusing the caller's if it sent
/// one, and run the rest of the stack inside a span carrying it.
async fn correlation_id(mut request: Request, next: Next) -> Response {
  let id = request
    .headers()
    .get(&CORRELATION_ID)
    .cloned()
    .unwrap_or_else(|| {
      HeaderValue::from_str(&uuid::Uuid::new_v4().to_string())
        .unwrap_or_else(|_| HeaderValue::from_static("unknown"))
    });
  request.headers_mut().insert(CORRELATION_ID, id.clone());

  let span = tracing::info_span!(
    "request",
    correlation_id = %id.to_str().unwrap_or_default(),
    method = %request.method(),
    path = %request.uri().path(),
  );
  let mut response = next.run(request).instrument(span).await;
  response.headers_mut().insert(CORRELATION_ID, id);
  response
}
