//! HTML page handlers.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/` | Landing page with the registered-applicants count |
//! | `GET`  | `/solicitar` | Submission form |
//! | `POST` | `/solicitar` | Form: `cedula`, `subvencion`, `tipo_bono`; 303 → `/exito` |
//! | `GET`  | `/exito` | Confirmation |
//! | `GET`  | `/solicitudes` | All requests with approve/reject links |
//! | `GET`  | `/buscar` | Search form |
//! | `POST` | `/buscar` | Form: `cedula` |
//! | `GET`  | `/estado/{id}/{nuevo_estado}` | Status change; 303 → `/solicitudes` |
//! | `GET`  | `/about` | Static description |

use axum::{
  Form,
  extract::{Path, State},
  http::StatusCode,
  response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use subsidy_core::{NewSubsidyRequest, RequestId, RequestStore};

use crate::{AppState, error::PageError, render};

// ─── Landing ─────────────────────────────────────────────────────────────────

/// `GET /` — never fails; the count degrades to zero.
pub async fn index<S>(State(state): State<AppState<S>>) -> Html<String>
where
  S: RequestStore + Clone + 'static,
{
  let registered = state.service.count_registered().await;
  Html(render::index(&state.config, registered))
}

// ─── Submit ──────────────────────────────────────────────────────────────────

/// Fields posted by the submission form. Missing fields arrive as empty
/// strings so they fail validation instead of being rejected by the extractor.
#[derive(Debug, Default, Deserialize)]
pub struct SubmitForm {
  #[serde(default)]
  pub cedula:     String,
  #[serde(default)]
  pub subvencion: String,
  #[serde(default)]
  pub tipo_bono:  Option<String>,
}

impl From<&SubmitForm> for NewSubsidyRequest {
  fn from(form: &SubmitForm) -> Self {
    NewSubsidyRequest {
      identity_number: form.cedula.clone(),
      subsidy_name:    form.subvencion.clone(),
      bonus_type:      form.tipo_bono.clone(),
    }
  }
}

/// `GET /solicitar`
pub async fn submit_form<S>(State(state): State<AppState<S>>) -> Html<String>
where
  S: RequestStore + Clone + 'static,
{
  Html(render::submit_form(&state.config, None, None))
}

/// `POST /solicitar` — on a validation error the form is shown again with the
/// submitted values and a 400 status.
pub async fn submit<S>(
  State(state): State<AppState<S>>,
  Form(form): Form<SubmitForm>,
) -> Result<Response, PageError>
where
  S: RequestStore + Clone + 'static,
{
  match state.service.submit_request(NewSubsidyRequest::from(&form)).await {
    Ok(_) => Ok(Redirect::to("/exito").into_response()),
    Err(subsidy_core::Error::Validation(msg)) => Ok(
      (
        StatusCode::BAD_REQUEST,
        Html(render::submit_form(&state.config, Some(&msg), Some(&form))),
      )
        .into_response(),
    ),
    Err(e) => Err(e.into()),
  }
}

/// `GET /exito`
pub async fn success<S>(State(state): State<AppState<S>>) -> Html<String>
where
  S: RequestStore + Clone + 'static,
{
  Html(render::success(&state.config))
}

// ─── List ────────────────────────────────────────────────────────────────────

/// `GET /solicitudes`
pub async fn list<S>(
  State(state): State<AppState<S>>,
) -> Result<Html<String>, PageError>
where
  S: RequestStore + Clone + 'static,
{
  let requests = state.service.list_requests().await?;
  Ok(Html(render::request_list(&state.config, &requests)))
}

// ─── Search ──────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct SearchForm {
  #[serde(default)]
  pub cedula: Option<String>,
}

/// `GET /buscar`
pub async fn search_form<S>(State(state): State<AppState<S>>) -> Html<String>
where
  S: RequestStore + Clone + 'static,
{
  Html(render::search(&state.config, "", None))
}

/// `POST /buscar`
pub async fn search<S>(
  State(state): State<AppState<S>>,
  Form(form): Form<SearchForm>,
) -> Result<Html<String>, PageError>
where
  S: RequestStore + Clone + 'static,
{
  let results = state
    .service
    .search_by_identity(form.cedula.as_deref())
    .await?;
  let cedula = form.cedula.as_deref().unwrap_or_default();
  Ok(Html(render::search(&state.config, cedula, Some(&results))))
}

// ─── Status ──────────────────────────────────────────────────────────────────

/// `GET /estado/{id}/{nuevo_estado}` — unknown targets are ignored, a missing
/// id is a 404.
pub async fn change_status<S>(
  State(state): State<AppState<S>>,
  Path((id, nuevo_estado)): Path<(RequestId, String)>,
) -> Result<Redirect, PageError>
where
  S: RequestStore + Clone + 'static,
{
  state.service.change_status(id, &nuevo_estado).await?;
  Ok(Redirect::to("/solicitudes"))
}

// ─── About ───────────────────────────────────────────────────────────────────

/// `GET /about`
pub async fn about<S>(State(state): State<AppState<S>>) -> Html<String>
where
  S: RequestStore + Clone + 'static,
{
  Html(render::about(&state.config))
}
