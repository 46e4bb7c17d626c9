//! Subsidy requests — the single entity tracked by the registry.
//!
//! A request is created once with status [`RequestStatus::Pending`]. After
//! that only its status ever changes; the applicant data is immutable.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Store-assigned identifier of a request.
pub type RequestId = i64;

/// Maximum length (in characters) of an identity number.
pub const IDENTITY_NUMBER_MAX_LEN: usize = 10;
/// Maximum length (in characters) of a subsidy name.
pub const SUBSIDY_NAME_MAX_LEN: usize = 50;
/// Maximum length (in characters) of a bonus type.
pub const BONUS_TYPE_MAX_LEN: usize = 20;

// ─── Status ──────────────────────────────────────────────────────────────────

/// Lifecycle state of a request.
///
/// Serialised with the Spanish labels used by the persisted table and the
/// forms: `"En revisión"`, `"Aprobado"`, `"Rechazado"`.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
pub enum RequestStatus {
  #[default]
  #[serde(rename = "En revisión")]
  Pending,
  #[serde(rename = "Aprobado")]
  Approved,
  #[serde(rename = "Rechazado")]
  Rejected,
}

impl RequestStatus {
  pub const ALL: [RequestStatus; 3] = [Self::Pending, Self::Approved, Self::Rejected];

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Pending => "En revisión",
      Self::Approved => "Aprobado",
      Self::Rejected => "Rechazado",
    }
  }

  /// `true` once a decision has been recorded.
  pub fn is_terminal(self) -> bool { !matches!(self, Self::Pending) }

  /// Whether a status change may set this status.
  ///
  /// A request can never be put back under review. Moving between the two
  /// decisions is allowed.
  pub fn is_valid_target(self) -> bool { self.is_terminal() }

  /// Parse a requested target status, returning `None` for anything that is
  /// not a valid target (including `"En revisión"` itself).
  pub fn parse_target(s: &str) -> Option<Self> {
    s.parse::<Self>().ok().filter(|status| status.is_valid_target())
  }
}

impl fmt::Display for RequestStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for RequestStatus {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    Self::ALL
      .into_iter()
      .find(|status| status.as_str() == s)
      .ok_or_else(|| Error::UnknownStatus(s.to_owned()))
  }
}

// ─── Entity ──────────────────────────────────────────────────────────────────

/// A persisted subsidy request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubsidyRequest {
  pub id:              RequestId,
  /// The applicant's national identifier (cédula).
  pub identity_number: String,
  pub subsidy_name:    String,
  /// Sub-category of the benefit, e.g. `"bono"` or `"credito"`.
  pub bonus_type:      Option<String>,
  pub status:          RequestStatus,
  /// Server-assigned at creation. `None` for rows carried over from a
  /// database that predates the timestamp column.
  pub submitted_at:    Option<DateTime<Utc>>,
}

/// Input for a new request. The id, status and timestamp are assigned by the
/// store.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NewSubsidyRequest {
  pub identity_number: String,
  pub subsidy_name:    String,
  pub bonus_type:      Option<String>,
}

impl NewSubsidyRequest {
  pub fn new(
    identity_number: impl Into<String>,
    subsidy_name: impl Into<String>,
  ) -> Self {
    Self {
      identity_number: identity_number.into(),
      subsidy_name:    subsidy_name.into(),
      bonus_type:      None,
    }
  }

  pub fn with_bonus_type(mut self, bonus_type: impl Into<String>) -> Self {
    self.bonus_type = Some(bonus_type.into());
    self
  }

  /// Trim every field and check presence and length.
  ///
  /// A blank bonus type is normalised to `None`.
  pub fn validated(self) -> Result<Self> {
    let identity_number = required("identity number", &self.identity_number)?;
    check_len("identity number", &identity_number, IDENTITY_NUMBER_MAX_LEN)?;

    let subsidy_name = required("subsidy name", &self.subsidy_name)?;
    check_len("subsidy name", &subsidy_name, SUBSIDY_NAME_MAX_LEN)?;

    let bonus_type = self
      .bonus_type
      .as_deref()
      .map(str::trim)
      .filter(|s| !s.is_empty())
      .map(str::to_owned);
    if let Some(bonus_type) = &bonus_type {
      check_len("bonus type", bonus_type, BONUS_TYPE_MAX_LEN)?;
    }

    Ok(Self { identity_number, subsidy_name, bonus_type })
  }
}

fn required(field: &str, value: &str) -> Result<String> {
  let trimmed = value.trim();
  if trimmed.is_empty() {
    return Err(Error::Validation(format!("{field} is required")));
  }
  Ok(trimmed.to_owned())
}

fn check_len(field: &str, value: &str, max: usize) -> Result<()> {
  if value.chars().count() > max {
    return Err(Error::Validation(format!(
      "{field} must be at most {max} characters"
    )));
  }
  Ok(())
}
