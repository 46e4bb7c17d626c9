//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings; statuses as their Spanish
//! labels.

use chrono::{DateTime, Utc};
use subsidy_core::{RequestId, RequestStatus, SubsidyRequest};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── RequestStatus ───────────────────────────────────────────────────────────

pub fn encode_status(status: RequestStatus) -> &'static str { status.as_str() }

pub fn decode_status(s: &str) -> Result<RequestStatus> { Ok(s.parse()?) }

// ─── Row type ────────────────────────────────────────────────────────────────

/// Raw values read directly from a `solicitud` row.
pub struct RawRequest {
  pub id:             RequestId,
  pub cedula:         String,
  pub subvencion:     String,
  pub tipo_bono:      Option<String>,
  pub estado:         String,
  pub fecha_registro: Option<String>,
}

impl RawRequest {
  /// Row mapper for statements selecting [`crate::schema::COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:             row.get(0)?,
      cedula:         row.get(1)?,
      subvencion:     row.get(2)?,
      tipo_bono:      row.get(3)?,
      estado:         row.get(4)?,
      fecha_registro: row.get(5)?,
    })
  }

  pub fn into_request(self) -> Result<SubsidyRequest> {
    Ok(SubsidyRequest {
      id:              self.id,
      identity_number: self.cedula,
      subsidy_name:    self.subvencion,
      bonus_type:      self.tipo_bono,
      status:          decode_status(&self.estado)?,
      submitted_at:    self.fecha_registro.as_deref().map(decode_dt).transpose()?,
    })
  }
}
