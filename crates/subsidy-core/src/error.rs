//! Error types for `subsidy-core`.

use thiserror::Error;

use crate::request::RequestId;

#[derive(Debug, Error)]
pub enum Error {
  /// A required field was missing, blank, or too long. Nothing was stored.
  #[error("validation failed: {0}")]
  Validation(String),

  #[error("subsidy request not found: {0}")]
  NotFound(RequestId),

  #[error("unknown request status: {0:?}")]
  UnknownStatus(String),

  /// The storage layer failed. Any partial change has been rolled back.
  #[error("persistence error: {0}")]
  Persistence(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn persistence<E>(source: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Persistence(Box::new(source))
  }

  pub fn is_not_found(&self) -> bool { matches!(self, Self::NotFound(_)) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
