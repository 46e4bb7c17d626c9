//! PostgreSQL backend for the subsidy request registry.
//!
//! Intended for shared deployments where several server processes use one
//! database. Schema is managed by the embedded `sqlx` migrations in
//! `migrations/`.

mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::{PgStore, normalize_url};
