//! Web layer for the subsidy request registry.
//!
//! Exposes an axum [`Router`] serving server-rendered HTML pages and a JSON API
//! under `/api`, backed by any [`RequestStore`] through a
//! [`RequestService`].

pub mod backend;
pub mod error;
pub mod handlers;
pub mod render;

pub use backend::StoreBackend;
pub use error::{ApiError, PageError};

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use serde::Deserialize;
use subsidy_core::{RequestService, RequestStore};
use tower_http::trace::TraceLayer;

use handlers::{api, pages};

// ─── Configuration ────────────────────────────────────────────────────────────

/// A subsidy advertised on the landing page and offered in the form.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct SubsidyOffer {
  pub name:       String,
  pub bonus_type: String,
}

/// Runtime server configuration, deserialised from `config.toml` and
/// `SUBSIDY_*` environment variables. Every field has a default.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:         String,
  pub port:         u16,
  /// Storage backend URL; see [`StoreBackend::from_url`].
  pub database_url: Option<String>,
  pub system_name:  String,
  pub description:  String,
  pub subsidies:    Vec<SubsidyOffer>,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:         "127.0.0.1".to_owned(),
      port:         8080,
      database_url: None,
      system_name:  "Sistema de Subvenciones".to_owned(),
      description:  "Registro y consulta de subvenciones agrícolas en Ecuador".to_owned(),
      subsidies:    vec![
        SubsidyOffer {
          name:       "Bono Agrícola".to_owned(),
          bonus_type: "bono".to_owned(),
        },
        SubsidyOffer {
          name:       "Crédito Productivo".to_owned(),
          bonus_type: "credito".to_owned(),
        },
      ],
    }
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: RequestStore> {
  pub service: RequestService<S>,
  pub config:  Arc<ServerConfig>,
}

impl<S: RequestStore> AppState<S> {
  pub fn new(store: S, config: ServerConfig) -> Self {
    Self {
      service: RequestService::new(Arc::new(store)),
      config:  Arc::new(config),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the JSON API routes; nested under `/api` by [`router`].
fn api_router<S>() -> Router<AppState<S>>
where
  S: RequestStore + Clone + 'static,
{
  Router::new()
    .route("/requests", get(api::list::<S>).post(api::create::<S>))
    .route("/requests/search", get(api::search::<S>))
    .route("/requests/{id}", get(api::get_one::<S>))
    .route("/requests/{id}/status", post(api::change_status::<S>))
    .route("/stats", get(api::stats::<S>))
}

/// Build the application [`Router`].
pub fn router<S>(state: AppState<S>) -> Router
where
  S: RequestStore + Clone + 'static,
{
  Router::new()
    .route("/",                           get(pages::index::<S>))
    .route("/solicitar",                  get(pages::submit_form::<S>).post(pages::submit::<S>))
    .route("/exito",                      get(pages::success::<S>))
    .route("/solicitudes",                get(pages::list::<S>))
    .route("/buscar",                     get(pages::search_form::<S>).post(pages::search::<S>))
    .route("/estado/{id}/{nuevo_estado}", get(pages::change_status::<S>))
    .route("/about",                      get(pages::about::<S>))
    .nest("/api", api_router::<S>())
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────
