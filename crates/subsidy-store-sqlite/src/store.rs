//! [`SqliteStore`] — the SQLite implementation of [`RequestStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use subsidy_core::{
  NewSubsidyRequest, RequestId, RequestStatus, RequestStore, SubsidyRequest,
};

use crate::{
  Error, Result,
  encode::{RawRequest, encode_dt, encode_status},
  schema::{COLUMNS, SCHEMA, UPGRADE_LEGACY},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A subsidy request store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    let upgraded = self
      .conn
      .call(|conn| {
        let columns = table_columns(conn, "solicitud")?;
        let legacy = !columns.is_empty()
          && !columns.iter().any(|c| c == "fecha_registro");
        if legacy {
          let tx = conn.transaction()?;
          tx.execute_batch(UPGRADE_LEGACY)?;
          tx.commit()?;
        }
        conn.execute_batch(SCHEMA)?;
        Ok(legacy)
      })
      .await?;

    if upgraded {
      tracing::info!("upgraded legacy solicitud table");
    }
    Ok(())
  }

  /// Run a `SELECT` over [`COLUMNS`] with one text parameter (or none) and
  /// decode every row.
  async fn select_many(
    &self,
    filter: Option<String>,
  ) -> Result<Vec<SubsidyRequest>> {
    let raws: Vec<RawRequest> = self
      .conn
      .call(move |conn| {
        let rows = if let Some(cedula) = filter {
          let mut stmt = conn.prepare(&format!(
            "SELECT {COLUMNS} FROM solicitud WHERE cedula = ?1 ORDER BY id"
          ))?;
          stmt
            .query_map(rusqlite::params![cedula], RawRequest::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
          let mut stmt =
            conn.prepare(&format!("SELECT {COLUMNS} FROM solicitud ORDER BY id"))?;
          stmt
            .query_map([], RawRequest::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRequest::into_request).collect()
  }
}

/// Column names of `table`; empty when the table does not exist.
fn table_columns(
  conn: &rusqlite::Connection,
  table: &str,
) -> rusqlite::Result<Vec<String>> {
  let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
  stmt
    .query_map([], |row| row.get::<_, String>(1))?
    .collect()
}

// ─── RequestStore impl ───────────────────────────────────────────────────────

impl RequestStore for SqliteStore {
  type Error = Error;

  async fn insert(&self, request: NewSubsidyRequest) -> Result<RequestId> {
    let at_str     = encode_dt(Utc::now());
    let status_str = encode_status(RequestStatus::Pending);

    let id = self
      .conn
      .call(move |conn| {
        // Dropping the transaction without commit rolls it back.
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO solicitud (cedula, subvencion, tipo_bono, estado, fecha_registro)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![
            request.identity_number,
            request.subsidy_name,
            request.bonus_type,
            status_str,
            at_str,
          ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(id)
      })
      .await?;

    tracing::debug!(id, "inserted solicitud row");
    Ok(id)
  }

  async fn find_all(&self) -> Result<Vec<SubsidyRequest>> {
    self.select_many(None).await
  }

  async fn find_by_identity<'a>(
    &'a self,
    identity_number: &'a str,
  ) -> Result<Vec<SubsidyRequest>> {
    self.select_many(Some(identity_number.to_owned())).await
  }

  async fn find_by_id(&self, id: RequestId) -> Result<SubsidyRequest> {
    let raw: Option<RawRequest> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {COLUMNS} FROM solicitud WHERE id = ?1"),
              rusqlite::params![id],
              RawRequest::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.ok_or(Error::NotFound(id))?.into_request()
  }

  async fn update_status(
    &self,
    id: RequestId,
    status: RequestStatus,
  ) -> Result<SubsidyRequest> {
    let status_str = encode_status(status);

    let raw: Option<RawRequest> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let changed = tx.execute(
          "UPDATE solicitud SET estado = ?1 WHERE id = ?2",
          rusqlite::params![status_str, id],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        let raw = tx.query_row(
          &format!("SELECT {COLUMNS} FROM solicitud WHERE id = ?1"),
          rusqlite::params![id],
          RawRequest::from_row,
        )?;
        tx.commit()?;
        Ok(Some(raw))
      })
      .await?;

    raw.ok_or(Error::NotFound(id))?.into_request()
  }

  async fn count(&self) -> Result<u64> {
    let n: i64 = self
      .conn
      .call(|conn| {
        Ok(conn.query_row("SELECT COUNT(*) FROM solicitud", [], |r| r.get(0))?)
      })
      .await?;
    Ok(n.max(0) as u64)
  }
}
