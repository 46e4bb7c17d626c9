//! Error type for `subsidy-store-postgres`.

use subsidy_core::RequestId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] subsidy_core::Error),

  #[error("database error: {0}")]
  Database(#[from] sqlx::Error),

  #[error("migration error: {0}")]
  Migrate(#[from] sqlx::migrate::MigrateError),

  #[error("subsidy request not found: {0}")]
  NotFound(RequestId),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl From<Error> for subsidy_core::Error {
  fn from(e: Error) -> Self {
    match e {
      Error::NotFound(id) => subsidy_core::Error::NotFound(id),
      other => subsidy_core::Error::persistence(other),
    }
  }
}
