//! Error types and axum `IntoResponse` implementations.
//!
//! [`PageError`] renders an HTML page; [`ApiError`] renders a JSON body. Both
//! hide storage details from the client and log them instead.

use axum::{
  Json,
  http::StatusCode,
  response::{Html, IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

const GENERIC_FAILURE: &str = "No se pudo completar la operación. Intente nuevamente.";

fn log_internal(e: &subsidy_core::Error) {
  tracing::error!(error = %e, "request failed in storage layer");
}

// ─── HTML ────────────────────────────────────────────────────────────────────

/// An error returned by an HTML page handler.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct PageError(#[from] pub subsidy_core::Error);

impl IntoResponse for PageError {
  fn into_response(self) -> Response {
    use subsidy_core::Error as E;

    let (status, title, text) = match &self.0 {
      E::NotFound(id) => (
        StatusCode::NOT_FOUND,
        "No encontrado",
        format!("No existe la solicitud {id}."),
      ),
      E::Validation(msg) => (StatusCode::BAD_REQUEST, "Datos inválidos", msg.clone()),
      other => {
        log_internal(other);
        (
          StatusCode::INTERNAL_SERVER_ERROR,
          "Error",
          GENERIC_FAILURE.to_owned(),
        )
      }
    };

    let body = format!(
      "<!DOCTYPE html>\n<html lang=\"es\"><head><meta charset=\"utf-8\"><title>{title}</title></head>\
       <body><h1>{title}</h1><p>{}</p><a href=\"/\">Volver</a></body></html>\n",
      crate::render::escape(&text),
    );
    (status, Html(body)).into_response()
  }
}

// ─── JSON ────────────────────────────────────────────────────────────────────

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("store error: {0}")]
  Store(#[source] subsidy_core::Error),
}

impl From<subsidy_core::Error> for ApiError {
  fn from(e: subsidy_core::Error) -> Self {
    match e {
      subsidy_core::Error::NotFound(id) => {
        ApiError::NotFound(format!("subsidy request {id} not found"))
      }
      subsidy_core::Error::Validation(msg) => ApiError::BadRequest(msg),
      other => ApiError::Store(other),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Store(e) => {
        log_internal(e);
        (StatusCode::INTERNAL_SERVER_ERROR, GENERIC_FAILURE.to_owned())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
