//! Claims, their review lifecycle, and the checks produced while processing
//! them.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{policy::Policy, user::User};

// ─── Status ──────────────────────────────────────────────────────────────────

/// The customer-visible lifecycle of a claim.
///
/// `Pending → Reviewing → {Approved | Denied}`.
#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  strum::Display,
  strum::AsRefStr,
  strum::EnumString,
)]
pub enum ClaimStatus {
  #[default]
  Pending,
  Reviewing,
  Approved,
  Denied,
}

/// The agent-side review status. Runs alongside [`ClaimStatus`] and adds an
/// escalation step.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  strum::Display,
  strum::AsRefStr,
  strum::EnumString,
)]
pub enum InternalStatus {
  Pending,
  Reviewing,
  #[serde(rename = "2nd Level Review")]
  #[strum(serialize = "2nd Level Review")]
  SecondLevelReview,
  Approved,
  Denied,
}

// ─── Claim ───────────────────────────────────────────────────────────────────

/// An insurance claim against exactly one policy.
///
/// Dates are relayed as the upstream formats them (ISO 8601 calendar dates).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
  pub id:                      i64,
  pub policy_id:               i64,
  pub claim_date:              String,
  pub damage_date:             String,
  pub date_of_repair:          String,
  #[serde(default)]
  pub status:                  ClaimStatus,
  #[serde(default)]
  pub status_message:          Option<String>,
  /// Invoice location; the agent API rewrites this into a download URL.
  #[serde(default)]
  pub invoices:                Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub internal_status:         Option<InternalStatus>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub internal_status_message: Option<String>,
  #[serde(default)]
  pub cause_of_damage:         Option<String>,
}

/// Partial update sent by `PUT /claims/:id`.
///
/// Relayed as the caller wrote it: the upstream merges whichever fields are
/// present, `invoices` and free-text statuses included.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClaimUpdate(pub Map<String, Value>);

impl ClaimUpdate {
  fn text(&self, field: &str) -> Option<&str> { self.0.get(field).and_then(Value::as_str) }

  pub fn status(&self) -> Option<&str> { self.text("status") }

  pub fn internal_status(&self) -> Option<&str> { self.text("internal_status") }
}

/// An invoice spooled to local disk, waiting to be relayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceFile {
  pub path:         PathBuf,
  /// Name reported to the upstream in the multipart part.
  pub file_name:    String,
  pub content_type: Option<String>,
}

/// Everything needed to file a claim: the invoice plus the form fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewClaim {
  pub invoice:         InvoiceFile,
  pub claim_date:      String,
  pub damage_date:     String,
  pub date_of_repair:  String,
  /// Only sent for device policies.
  pub cause_of_damage: Option<String>,
}

// ─── Checks ──────────────────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum::Display,
)]
pub enum CheckStatus {
  #[default]
  Pending,
  Passed,
  Failed,
}

/// A verification record produced by upstream claim processing. Read-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Check {
  pub id:             i64,
  pub claim_id:       i64,
  pub check_name:     String,
  #[serde(default)]
  pub expected_value: Option<String>,
  #[serde(default)]
  pub reviewed_value: Option<String>,
  #[serde(default)]
  pub operator:       Option<String>,
  #[serde(default)]
  pub status:         CheckStatus,
  #[serde(default)]
  pub result_message: Option<String>,
  #[serde(default)]
  pub processed_at:   Option<String>,
}

/// The policy a claim was filed against, with its holder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimPolicy {
  pub policy:        Policy,
  pub policy_holder: User,
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn decodes_agent_claim() {
    let claim: Claim = serde_json::from_value(json!({
      "id": 4,
      "policy_id": 2,
      "claim_date": "2024-09-01",
      "damage_date": "2024-08-30",
      "date_of_repair": "2024-09-03",
      "status": "Reviewing",
      "status_message": null,
      "invoices": "http://127.0.0.1:5100/claims/4/invoices",
      "internal_status": "2nd Level Review",
      "internal_status_message": "over threshold",
      "cause_of_damage": null
    }))
    .unwrap();
    assert_eq!(claim.status, ClaimStatus::Reviewing);
    assert_eq!(claim.internal_status, Some(InternalStatus::SecondLevelReview));
  }

  #[test]
  fn customer_claim_defaults_to_pending() {
    let claim: Claim = serde_json::from_value(json!({
      "id": 1,
      "policy_id": 1,
      "claim_date": "2024-09-01",
      "damage_date": "2024-08-30",
      "date_of_repair": "2024-09-03"
    }))
    .unwrap();
    assert_eq!(claim.status, ClaimStatus::Pending);
    assert_eq!(claim.internal_status, None);
  }

  #[test]
  fn claim_update_is_relayed_verbatim() {
    let body = json!({
      "status": "Escalated",
      "internal_status": "2nd Level Review",
      "invoices": "uploads/4-receipt.pdf"
    });
    let update: ClaimUpdate = serde_json::from_value(body.clone()).unwrap();
    assert_eq!(update.status(), Some("Escalated"));
    assert_eq!(update.internal_status(), Some("2nd Level Review"));
    assert_eq!(serde_json::to_value(&update).unwrap(), body);
  }

  #[test]
  fn claim_update_must_be_an_object() {
    assert!(serde_json::from_value::<ClaimUpdate>(json!(["Denied"])).is_err());
  }

  #[test]
  fn status_query_strings() {
    assert_eq!(ClaimStatus::Pending.as_ref(), "Pending");
    assert_eq!(InternalStatus::SecondLevelReview.as_ref(), "2nd Level Review");
    assert_eq!(
      "2nd Level Review".parse::<InternalStatus>().unwrap(),
      InternalStatus::SecondLevelReview
    );
  }
}
