//! JSON API handlers, nested under `/api`.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/requests` | All requests in insertion order |
//! | `POST` | `/requests` | Body: [`NewSubsidyRequest`]; returns 201 + `{"id":..}` |
//! | `GET`  | `/requests/search` | `?cedula=`; blank or missing matches nothing |
//! | `GET`  | `/requests/{id}` | 404 if not found |
//! | `POST` | `/requests/{id}/status` | Body: `{"estado":"Aprobado"}` |
//! | `GET`  | `/stats` | `{"solicitantes_registrados":..}` |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use subsidy_core::{NewSubsidyRequest, RequestId, RequestStore, SubsidyRequest};

use crate::{AppState, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /requests`
pub async fn list<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<SubsidyRequest>>, ApiError>
where
  S: RequestStore + Clone + 'static,
{
  Ok(Json(state.service.list_requests().await?))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct Created {
  pub id: RequestId,
}

/// `POST /requests` — returns 201 + the assigned id.
pub async fn create<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<NewSubsidyRequest>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RequestStore + Clone + 'static,
{
  let id = state.service.submit_request(body).await?;
  Ok((StatusCode::CREATED, Json(Created { id })))
}

// ─── Search ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct SearchParams {
  pub cedula: Option<String>,
}

/// `GET /requests/search[?cedula=...]`
pub async fn search<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<SearchParams>,
) -> Result<Json<Vec<SubsidyRequest>>, ApiError>
where
  S: RequestStore + Clone + 'static,
{
  let found = state
    .service
    .search_by_identity(params.cedula.as_deref())
    .await?;
  Ok(Json(found))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /requests/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<RequestId>,
) -> Result<Json<SubsidyRequest>, ApiError>
where
  S: RequestStore + Clone + 'static,
{
  Ok(Json(state.service.get_request(id).await?))
}

// ─── Status ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct StatusBody {
  /// Missing is treated like any other invalid target.
  #[serde(default)]
  pub estado: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusOutcome {
  /// `false` when the requested status was not a valid target.
  pub applied: bool,
  pub request: SubsidyRequest,
}

/// `POST /requests/{id}/status` — body: `{"estado":"Aprobado"|"Rechazado"}`.
pub async fn change_status<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<RequestId>,
  Json(body): Json<StatusBody>,
) -> Result<Json<StatusOutcome>, ApiError>
where
  S: RequestStore + Clone + 'static,
{
  let change = state.service.change_status(id, &body.estado).await?;
  Ok(Json(StatusOutcome {
    applied: change.is_applied(),
    request: change.into_request(),
  }))
}

// ─── Stats ────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct Stats {
  pub solicitantes_registrados: u64,
}

/// `GET /stats`
pub async fn stats<S>(State(state): State<AppState<S>>) -> Json<Stats>
where
  S: RequestStore + Clone + 'static,
{
  Json(Stats {
    solicitantes_registrados: state.service.count_registered().await,
  })
}
