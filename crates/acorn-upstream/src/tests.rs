//! Tests for `HttpUpstream` against a throwaway axum server standing in for
//! the claims API.

use std::{
  collections::HashMap,
  sync::{Arc, Mutex},
  time::Duration,
};

use acorn_core::{
  claim::{ClaimStatus, ClaimUpdate, InvoiceFile, NewClaim},
  policy::{Coverage, FormNumber, PolicyNumber},
  token::BearerToken,
  upstream::{ClaimsUpstream, UpstreamFailure},
  user::Credentials,
};
use axum::{
  Json, Router,
  extract::{Multipart, Path, Query, State},
  http::{HeaderMap, StatusCode, header},
  response::{IntoResponse, Response},
  routing::{get, post},
};
use serde_json::{Value, json};
use tokio::net::TcpListener;

use crate::{Error, HttpUpstream};

// ─── Fake claims API ─────────────────────────────────────────────────────────

#[derive(Default)]
struct Seen {
  authorization: Vec<Option<String>>,
  status_query:  Vec<Option<String>>,
  form_fields:   Vec<(String, String)>,
  update_body:   Option<Value>,
}

type Shared = Arc<Mutex<Seen>>;

fn claim_json(id: i64, status: &str) -> Value {
  json!({
    "id": id,
    "policy_id": 1,
    "claim_date": "2024-09-01",
    "damage_date": "2024-08-30",
    "date_of_repair": "2024-09-03",
    "status": status,
    "status_message": null,
    "invoices": null,
    "cause_of_damage": null
  })
}

fn record_auth(seen: &Shared, headers: &HeaderMap) -> bool {
  let auth = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .map(str::to_owned);
  let ok = auth.as_deref() == Some("Bearer tok");
  seen.lock().unwrap().authorization.push(auth);
  ok
}

fn unauthorized() -> Response {
  (
    StatusCode::UNAUTHORIZED,
    Json(json!({ "msg": "Missing Authorization Header" })),
  )
    .into_response()
}

async fn login(Json(body): Json<Value>) -> Response {
  if body["password"] == "secret" {
    Json(json!({ "access_token": "agent-jwt" })).into_response()
  } else {
    (
      StatusCode::UNAUTHORIZED,
      Json(json!({ "message": "Invalid username or password" })),
    )
      .into_response()
  }
}

async fn customer_login(Json(body): Json<Value>) -> Response {
  Json(json!({
    "access_token": "customer-jwt",
    "user": {
      "id": 1,
      "first_name": "Ada",
      "last_name": "Lovelace",
      "phone": null,
      "email": "ada@example.com",
      "username": body["username"]
    }
  }))
  .into_response()
}

async fn list_claims(
  State(seen): State<Shared>,
  headers: HeaderMap,
  Query(params): Query<HashMap<String, String>>,
) -> Response {
  if !record_auth(&seen, &headers) {
    return unauthorized();
  }
  let status = params.get("status").cloned();
  seen.lock().unwrap().status_query.push(status.clone());
  let claims: Vec<Value> = [claim_json(1, "Pending"), claim_json(2, "Approved")]
    .into_iter()
    .filter(|c| status.as_deref().is_none_or(|s| c["status"] == s))
    .collect();
  Json(claims).into_response()
}

async fn get_claim(Path(id): Path<i64>) -> Response {
  if id == 999 {
    return (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response();
  }
  Json(claim_json(id, "Pending")).into_response()
}

async fn update_claim(
  State(seen): State<Shared>,
  Path(id): Path<i64>,
  Json(body): Json<Value>,
) -> Response {
  seen.lock().unwrap().update_body = Some(body);
  Json(claim_json(id, "Denied")).into_response()
}

async fn list_policies(State(seen): State<Shared>, headers: HeaderMap) -> Response {
  if !record_auth(&seen, &headers) {
    return unauthorized();
  }
  Json(json!([
    {
      "id": 1, "type": "Windscreen", "policy_number": "WS-1", "user_id": 1,
      "deductible": 100.0,
      "vehicle": { "id": 5, "make": "Ford", "model": "Focus", "year": 2019,
                   "license_plate": "XY19 ABC", "drivers": "1" },
      "device": null
    },
    {
      "id": 2, "type": "Device", "policy_number": "DV-1", "user_id": 1,
      "deductible": "", "device": null, "vehicle": null
    }
  ]))
  .into_response()
}

async fn file_claim(
  State(seen): State<Shared>,
  Path((_uid, pnum)): Path<(i64, String)>,
  headers: HeaderMap,
  mut multipart: Multipart,
) -> Response {
  if !record_auth(&seen, &headers) {
    return unauthorized();
  }
  let mut fields = Vec::new();
  while let Some(field) = multipart.next_field().await.unwrap() {
    let name = field.name().unwrap_or_default().to_owned();
    let value = match field.file_name().map(str::to_owned) {
      Some(file_name) => format!("{file_name}:{}", field.text().await.unwrap()),
      None => field.text().await.unwrap(),
    };
    fields.push((name, value));
  }
  fields.push(("policy_number".into(), pnum));
  seen.lock().unwrap().form_fields = fields;
  (StatusCode::CREATED, Json(claim_json(10, "Pending"))).into_response()
}

async fn features() -> Json<Value> {
  Json(json!({ "new_claim_flow": true, "agent_bulk_review": false }))
}

fn fake_api(seen: Shared) -> Router {
  Router::new()
    .route("/login", post(login))
    .route("/users/login", post(customer_login))
    .route("/claims", get(list_claims))
    .route("/claims/{id}", get(get_claim).put(update_claim))
    .route("/users/{uid}/policies", get(list_policies))
    .route("/users/{uid}/policies/{pnum}/claims", post(file_claim))
    .route("/system/features", get(features))
    .with_state(seen)
}

async fn spawn() -> (HttpUpstream, Shared) {
  let seen = Shared::default();
  let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
  let addr = listener.local_addr().unwrap();
  let app = fake_api(seen.clone());
  tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
  let upstream =
    HttpUpstream::new(&format!("http://{addr}"), Duration::from_secs(5)).unwrap();
  (upstream, seen)
}

fn creds(password: &str) -> Credentials {
  Credentials { username: "agent".into(), password: password.into() }
}

// ─── Sessions ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn agent_login_returns_issued_token() {
  let (upstream, _) = spawn().await;
  let token = upstream.login_agent(&creds("secret")).await.unwrap();
  assert_eq!(token.as_str(), "agent-jwt");
}

#[tokio::test]
async fn rejected_login_keeps_status_and_body() {
  let (upstream, _) = spawn().await;
  let err = upstream.login_agent(&creds("wrong")).await.unwrap_err();
  assert_eq!(err.status(), Some(401));
  assert_eq!(
    err.body().unwrap()["message"],
    "Invalid username or password"
  );
}

#[tokio::test]
async fn customer_login_returns_token_and_user() {
  let (upstream, _) = spawn().await;
  let session = upstream.login_customer(&creds("pw")).await.unwrap();
  assert_eq!(session.access_token.as_str(), "customer-jwt");
  assert_eq!(session.user.id, Some(1));
  assert_eq!(session.user.username, "agent");
}

// ─── Claims ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn list_claims_forwards_bearer_and_status_filter() {
  let (upstream, seen) = spawn().await;
  let token = BearerToken::new("tok");

  let all = upstream.list_claims(&token, None).await.unwrap();
  let pending = upstream.list_claims(&token, Some("Pending")).await.unwrap();
  let lost = upstream.list_claims(&token, Some("Lost")).await.unwrap();

  assert_eq!(all.len(), 2);
  assert_eq!(pending.len(), 1);
  assert_eq!(pending[0].status, ClaimStatus::Pending);
  assert!(lost.is_empty());

  let seen = seen.lock().unwrap();
  assert_eq!(seen.authorization, vec![Some("Bearer tok".to_owned()); 3]);
  assert_eq!(seen.status_query, vec![
    None,
    Some("Pending".to_owned()),
    Some("Lost".to_owned())
  ]);
}

#[tokio::test]
async fn update_claim_puts_the_body_unchanged() {
  let (upstream, seen) = spawn().await;
  let body = json!({
    "status": "Denied",
    "internal_status": "2nd Level Review",
    "invoices": "uploads/4-receipt.pdf"
  });
  let update: ClaimUpdate = serde_json::from_value(body.clone()).unwrap();

  let claim = upstream
    .update_claim(&BearerToken::new("tok"), 4, &update)
    .await
    .unwrap();
  assert_eq!(claim.id, 4);
  assert_eq!(seen.lock().unwrap().update_body, Some(body));
}

#[tokio::test]
async fn wrong_token_surfaces_upstream_401() {
  let (upstream, _) = spawn().await;
  let err = upstream
    .list_claims(&BearerToken::new("nope"), None)
    .await
    .unwrap_err();
  assert_eq!(err.status(), Some(401));
}

#[tokio::test]
async fn non_json_error_body_is_kept_as_text() {
  let (upstream, _) = spawn().await;
  let err = upstream
    .get_claim(&BearerToken::new("tok"), 999)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Status { status: 500, .. }));
  assert_eq!(err.body(), Some(&Value::String("boom".into())));
}

// ─── Policies ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn policies_decode_into_coverage() {
  let (upstream, _) = spawn().await;
  let policies = upstream
    .list_policies(&BearerToken::new("tok"), 1)
    .await
    .unwrap();
  assert_eq!(policies.len(), 2);
  assert!(matches!(
    &policies[0].coverage,
    Coverage::Windscreen { vehicle: Some(v) } if v.make == "Ford"
  ));
  assert_eq!(policies[1].coverage, Coverage::Device { device: None });
  assert_eq!(policies[1].deductible, Some(FormNumber::Text(String::new())));
}

// ─── Multipart relay ─────────────────────────────────────────────────────────

#[tokio::test]
async fn create_claim_sends_invoice_and_form_fields() {
  let (upstream, seen) = spawn().await;
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("1700000000000-invoice.txt");
  std::fs::write(&path, "INVOICE #42").unwrap();

  let claim = NewClaim {
    invoice:         InvoiceFile {
      path,
      file_name: "invoice.txt".into(),
      content_type: Some("text/plain".into()),
    },
    claim_date:      "2024-09-01".into(),
    damage_date:     "2024-08-30".into(),
    date_of_repair:  "2024-09-03".into(),
    cause_of_damage: Some("Dropped".into()),
  };
  let pnum: PolicyNumber = "DV-1".parse().unwrap();

  let created = upstream
    .create_claim(&BearerToken::new("tok"), 1, &pnum, &claim)
    .await
    .unwrap();
  assert_eq!(created.id, 10);

  let fields = seen.lock().unwrap().form_fields.clone();
  let get = |name: &str| {
    fields
      .iter()
      .find(|(n, _)| n == name)
      .map(|(_, v)| v.clone())
  };
  assert_eq!(get("invoice").as_deref(), Some("invoice.txt:INVOICE #42"));
  assert_eq!(get("claim_date").as_deref(), Some("2024-09-01"));
  assert_eq!(get("damage_date").as_deref(), Some("2024-08-30"));
  assert_eq!(get("date_of_repair").as_deref(), Some("2024-09-03"));
  assert_eq!(get("cause_of_damage").as_deref(), Some("Dropped"));
  assert_eq!(get("policy_number").as_deref(), Some("DV-1"));
}

#[tokio::test]
async fn large_invoice_arrives_whole() {
  let (upstream, seen) = spawn().await;
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("scan.txt");
  let contents = "0123456789".repeat(50_000);
  std::fs::write(&path, &contents).unwrap();

  let claim = NewClaim {
    invoice:         InvoiceFile { path, file_name: "scan.txt".into(), content_type: None },
    claim_date:      "2024-09-01".into(),
    damage_date:     "2024-08-30".into(),
    date_of_repair:  "2024-09-03".into(),
    cause_of_damage: None,
  };
  let pnum: PolicyNumber = "WS-1".parse().unwrap();
  upstream
    .create_claim(&BearerToken::new("tok"), 1, &pnum, &claim)
    .await
    .unwrap();

  let fields = seen.lock().unwrap().form_fields.clone();
  let (_, invoice) = fields.iter().find(|(n, _)| n == "invoice").unwrap();
  assert_eq!(invoice.strip_prefix("scan.txt:"), Some(contents.as_str()));
}

#[tokio::test]
async fn missing_invoice_file_fails_before_sending() {
  let (upstream, seen) = spawn().await;
  let claim = NewClaim {
    invoice:         InvoiceFile {
      path:         "/nonexistent/acorn/invoice.pdf".into(),
      file_name:    "invoice.pdf".into(),
      content_type: None,
    },
    claim_date:      "2024-09-01".into(),
    damage_date:     "2024-08-30".into(),
    date_of_repair:  "2024-09-03".into(),
    cause_of_damage: None,
  };
  let pnum: PolicyNumber = "WS-1".parse().unwrap();

  let err = upstream
    .create_claim(&BearerToken::new("tok"), 1, &pnum, &claim)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Invoice(_)));
  assert!(seen.lock().unwrap().authorization.is_empty());
}

// ─── System & transport ──────────────────────────────────────────────────────

#[tokio::test]
async fn features_need_no_token() {
  let (upstream, _) = spawn().await;
  let flags = upstream.features().await.unwrap();
  assert_eq!(flags.get("new_claim_flow"), Some(&json!(true)));
}

#[tokio::test]
async fn unreachable_upstream_is_a_transport_error() {
  let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
  let addr = listener.local_addr().unwrap();
  drop(listener);

  let upstream =
    HttpUpstream::new(&format!("http://{addr}"), Duration::from_secs(2)).unwrap();
  let err = upstream.features().await.unwrap_err();
  assert!(matches!(err, Error::Transport(_)));
  assert_eq!(err.status(), None);
  assert!(err.body().is_none());
}

#[test]
fn relative_base_url_is_rejected() {
  let err = HttpUpstream::new("not a url", Duration::from_secs(1)).err();
  assert!(matches!(err, Some(Error::BaseUrl(_))));
}
