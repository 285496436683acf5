//! Policies and the insured items attached to them.
//!
//! A policy is created bare and later completed by an add-vehicle or
//! add-device call, so the insured item is optional. Which item a policy can
//! carry is decided by its type, modelled here as the [`Coverage`] sum type.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{Error, Result};

// ─── Policy number ───────────────────────────────────────────────────────────

/// A customer-facing policy number, e.g. `"WS-1001"`.
///
/// Never empty and never the literal `"undefined"`, which is what browser
/// callers interpolate into URLs before a policy has been selected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PolicyNumber(String);

impl PolicyNumber {
  pub fn as_str(&self) -> &str { &self.0 }
}

impl TryFrom<String> for PolicyNumber {
  type Error = Error;

  fn try_from(value: String) -> Result<Self> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed == "undefined" {
      return Err(Error::MissingPolicyNumber);
    }
    Ok(Self(trimmed.to_owned()))
  }
}

impl FromStr for PolicyNumber {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> { Self::try_from(s.to_owned()) }
}

impl From<PolicyNumber> for String {
  fn from(value: PolicyNumber) -> Self { value.0 }
}

impl fmt::Display for PolicyNumber {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

// ─── Form numbers ────────────────────────────────────────────────────────────

/// A numeric field as browser forms send it: a JSON number, its text, or `""`
/// for a field left blank. Relayed unchanged; the upstream stores either.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormNumber {
  Number(serde_json::Number),
  Text(String),
}

impl From<i64> for FormNumber {
  fn from(value: i64) -> Self { FormNumber::Number(value.into()) }
}

impl From<&str> for FormNumber {
  fn from(value: &str) -> Self { FormNumber::Text(value.to_owned()) }
}

// ─── Insured items ───────────────────────────────────────────────────────────

/// A vehicle covered by a windscreen policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
  pub id:            i64,
  pub make:          String,
  pub model:         String,
  pub year:          FormNumber,
  #[serde(default)]
  pub license_plate: Option<String>,
  /// Free-form; the upstream stores either a name list or a user id here.
  #[serde(default)]
  pub drivers:       Option<Value>,
}

/// Body of `POST .../vehicles`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewVehicle {
  pub make:          String,
  pub model:         String,
  pub year:          FormNumber,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub license_plate: Option<String>,
}

/// A device covered by a device policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
  pub id:                 i64,
  pub manufacturer:       String,
  pub model:              String,
  #[serde(default)]
  pub storage:            Option<String>,
  #[serde(default)]
  pub serial_number:      Option<String>,
  #[serde(default)]
  pub purchase_date:      Option<String>,
  #[serde(default)]
  pub purchase_amount:    Option<FormNumber>,
  #[serde(default)]
  pub purchase_location:  Option<String>,
  #[serde(default)]
  pub depreciation_years: Option<i64>,
  #[serde(default)]
  pub depreciation_rate:  Option<f64>,
}

/// Body of `POST .../devices`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDevice {
  pub manufacturer:      String,
  pub model:             String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub storage:           Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub serial_number:     Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub purchase_date:     Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub purchase_amount:   Option<FormNumber>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub purchase_location: Option<String>,
}

// ─── Policy ──────────────────────────────────────────────────────────────────

/// The policy type discriminant, as it appears in the `type` field.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display,
  strum::EnumString,
)]
pub enum PolicyKind {
  Windscreen,
  Device,
}

/// What a policy covers, carrying the insured item once it has been added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Coverage {
  Windscreen {
    #[serde(default, deserialize_with = "attached")]
    vehicle: Option<Vehicle>,
  },
  Device {
    #[serde(default, deserialize_with = "attached")]
    device: Option<Device>,
  },
}

impl Coverage {
  pub fn kind(&self) -> PolicyKind {
    match self {
      Coverage::Windscreen { .. } => PolicyKind::Windscreen,
      Coverage::Device { .. } => PolicyKind::Device,
    }
  }

  /// `true` once the vehicle or device has been attached.
  pub fn is_complete(&self) -> bool {
    match self {
      Coverage::Windscreen { vehicle } => vehicle.is_some(),
      Coverage::Device { device } => device.is_some(),
    }
  }
}

/// An insurance policy as returned by the upstream API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
  pub id:            i64,
  pub policy_number: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub user_id:       Option<i64>,
  #[serde(default)]
  pub deductible:    Option<FormNumber>,
  #[serde(flatten)]
  pub coverage:      Coverage,
}

impl Policy {
  pub fn kind(&self) -> PolicyKind { self.coverage.kind() }
}

/// Body of `POST /users/:id/policies`. The policy starts bare.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPolicy {
  #[serde(rename = "type")]
  pub kind:          PolicyKind,
  pub policy_number: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub deductible:    Option<FormNumber>,
}

/// Decode an optionally-attached insured item.
///
/// The agent API marshals a missing nested object as an object whose fields
/// are all `null`; that shape means "not attached" just like `null` does.
fn attached<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
  D: Deserializer<'de>,
  T: DeserializeOwned,
{
  let value = Option::<Value>::deserialize(deserializer)?;
  match value {
    None | Some(Value::Null) => Ok(None),
    Some(Value::Object(map)) if map.values().all(Value::is_null) => Ok(None),
    Some(v) => serde_json::from_value(v)
      .map(Some)
      .map_err(serde::de::Error::custom),
  }
}
