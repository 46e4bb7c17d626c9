//! [`PgStore`] — the PostgreSQL implementation of [`RequestStore`].

use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::{PgPool, postgres::PgPoolOptions};
use subsidy_core::{
  NewSubsidyRequest, RequestId, RequestStatus, RequestStore, SubsidyRequest,
};

use crate::{Error, Result};

const SELECT_ALL: &str = "SELECT id, cedula, subvencion, tipo_bono, estado, fecha_registro
   FROM solicitud ORDER BY id";

const SELECT_BY_CEDULA: &str = "SELECT id, cedula, subvencion, tipo_bono, estado, fecha_registro
   FROM solicitud WHERE cedula = $1 ORDER BY id";

const SELECT_BY_ID: &str = "SELECT id, cedula, subvencion, tipo_bono, estado, fecha_registro
   FROM solicitud WHERE id = $1";

const UPDATE_STATUS: &str = "UPDATE solicitud SET estado = $1 WHERE id = $2
   RETURNING id, cedula, subvencion, tipo_bono, estado, fecha_registro";

/// Rewrite the legacy `postgres://` scheme to `postgresql://`.
pub fn normalize_url(url: &str) -> String {
  match url.strip_prefix("postgres://") {
    Some(rest) => format!("postgresql://{rest}"),
    None => url.to_owned(),
  }
}

/// Internal row type for sqlx mapping.
#[derive(sqlx::FromRow)]
struct RequestRow {
  id:             i64,
  cedula:         String,
  subvencion:     String,
  tipo_bono:      Option<String>,
  estado:         String,
  fecha_registro: Option<DateTime<Utc>>,
}

impl RequestRow {
  fn into_request(self) -> Result<SubsidyRequest> {
    Ok(SubsidyRequest {
      id:              self.id,
      identity_number: self.cedula,
      subsidy_name:    self.subvencion,
      bonus_type:      self.tipo_bono,
      status:          self.estado.parse()?,
      submitted_at:    self.fecha_registro,
    })
  }
}

fn decode_rows(rows: Vec<RequestRow>) -> Result<Vec<SubsidyRequest>> {
  rows.into_iter().map(RequestRow::into_request).collect()
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A subsidy request store backed by a PostgreSQL connection pool.
///
/// Cloning is cheap — the pool is reference-counted.
#[derive(Clone)]
pub struct PgStore {
  pool: PgPool,
}

impl PgStore {
  /// Connect to `url` and apply pending migrations.
  pub async fn connect(url: &str) -> Result<Self> {
    let pool = PgPoolOptions::new()
      .max_connections(10)
      .acquire_timeout(Duration::from_secs(5))
      .connect(&normalize_url(url))
      .await?;

    tracing::info!("Connected to PostgreSQL");

    let store = Self::from_pool(pool);
    store.migrate().await?;
    Ok(store)
  }

  pub fn from_pool(pool: PgPool) -> Self { Self { pool } }

  pub async fn migrate(&self) -> Result<()> {
    sqlx::migrate!("./migrations").run(&self.pool).await?;
    tracing::info!("Database migrations applied");
    Ok(())
  }
}

// ─── RequestStore impl ───────────────────────────────────────────────────────

impl RequestStore for PgStore {
  type Error = Error;

  async fn insert(&self, request: NewSubsidyRequest) -> Result<RequestId> {
    // Rolled back on drop if anything below fails.
    let mut tx = self.pool.begin().await?;

    let id: i64 = sqlx::query_scalar(
      "INSERT INTO solicitud (cedula, subvencion, tipo_bono, estado)
       VALUES ($1, $2, $3, $4)
       RETURNING id",
    )
    .bind(&request.identity_number)
    .bind(&request.subsidy_name)
    .bind(&request.bonus_type)
    .bind(RequestStatus::Pending.as_str())
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::debug!(id, "inserted solicitud row");
    Ok(id)
  }

  async fn find_all(&self) -> Result<Vec<SubsidyRequest>> {
    let rows = sqlx::query_as::<_, RequestRow>(SELECT_ALL)
      .fetch_all(&self.pool)
      .await?;
    decode_rows(rows)
  }

  async fn find_by_identity<'a>(
    &'a self,
    identity_number: &'a str,
  ) -> Result<Vec<SubsidyRequest>> {
    let rows = sqlx::query_as::<_, RequestRow>(SELECT_BY_CEDULA)
      .bind(identity_number)
      .fetch_all(&self.pool)
      .await?;
    decode_rows(rows)
  }

  async fn find_by_id(&self, id: RequestId) -> Result<SubsidyRequest> {
    sqlx::query_as::<_, RequestRow>(SELECT_BY_ID)
      .bind(id)
      .fetch_optional(&self.pool)
      .await?
      .ok_or(Error::NotFound(id))?
      .into_request()
  }

  async fn update_status(
    &self,
    id: RequestId,
    status: RequestStatus,
  ) -> Result<SubsidyRequest> {
    let mut tx = self.pool.begin().await?;

    let row = sqlx::query_as::<_, RequestRow>(UPDATE_STATUS)
      .bind(status.as_str())
      .bind(id)
      .fetch_optional(&mut *tx)
      .await?
      .ok_or(Error::NotFound(id))?;

    tx.commit().await?;
    row.into_request()
  }

  async fn count(&self) -> Result<u64> {
    let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM solicitud")
      .fetch_one(&self.pool)
      .await?;
    Ok(n.max(0) as u64)
  }
}
