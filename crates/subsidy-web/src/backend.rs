//! Storage backend selection from a database URL.

use std::path::PathBuf;

use thiserror::Error;

/// SQLite file used when no database URL is configured.
pub const DEFAULT_SQLITE_PATH: &str = "subvenciones.db";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BackendError {
  #[error("unsupported database url scheme: {0:?}")]
  UnsupportedScheme(String),

  #[error("sqlite url has an empty path")]
  EmptyPath,
}

/// Which [`RequestStore`](subsidy_core::RequestStore) implementation to open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
  /// Embedded SQLite file.
  Sqlite(PathBuf),
  /// Networked PostgreSQL; holds the connection URL.
  Postgres(String),
}

impl StoreBackend {
  /// Interpret a database URL.
  ///
  /// - absent or blank → [`DEFAULT_SQLITE_PATH`]
  /// - `postgres://…`, `postgresql://…` → PostgreSQL
  /// - `sqlite:///rel.db`, `sqlite:////abs.db`, `sqlite://rel.db`,
  ///   `sqlite:rel.db` → SQLite file
  /// - anything without a scheme → SQLite file at that path
  pub fn from_url(url: Option<&str>) -> Result<Self, BackendError> {
    let Some(url) = url.map(str::trim).filter(|u| !u.is_empty()) else {
      return Ok(Self::Sqlite(PathBuf::from(DEFAULT_SQLITE_PATH)));
    };

    if url.starts_with("postgres://") || url.starts_with("postgresql://") {
      return Ok(Self::Postgres(url.to_owned()));
    }

    if let Some(rest) = url.strip_prefix("sqlite:") {
      // `sqlite:///x` is relative, `sqlite:////x` absolute.
      let path = rest.strip_prefix("//").unwrap_or(rest);
      let path = if rest.starts_with("//") {
        path.strip_prefix('/').unwrap_or(path)
      } else {
        path
      };
      if path.is_empty() {
        return Err(BackendError::EmptyPath);
      }
      return Ok(Self::Sqlite(PathBuf::from(path)));
    }

    if let Some((scheme, _)) = url.split_once("://") {
      return Err(BackendError::UnsupportedScheme(scheme.to_owned()));
    }

    Ok(Self::Sqlite(PathBuf::from(url)))
  }

  /// A log-safe description (no credentials).
  pub fn describe(&self) -> String {
    match self {
      Self::Sqlite(path) => format!("sqlite file {}", path.display()),
      Self::Postgres(_) => "postgresql".to_owned(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn sqlite(p: &str) -> StoreBackend { StoreBackend::Sqlite(PathBuf::from(p)) }

  #[test]
  fn absent_or_blank_url_uses_embedded_default() {
    assert_eq!(StoreBackend::from_url(None).unwrap(), sqlite(DEFAULT_SQLITE_PATH));
    assert_eq!(StoreBackend::from_url(Some("  ")).unwrap(), sqlite(DEFAULT_SQLITE_PATH));
  }

  #[test]
  fn postgres_schemes() {
    for url in ["postgres://u:p@db/s", "postgresql://u:p@db/s"] {
      assert_eq!(
        StoreBackend::from_url(Some(url)).unwrap(),
        StoreBackend::Postgres(url.to_owned())
      );
    }
  }

  #[test]
  fn sqlite_url_forms() {
    assert_eq!(StoreBackend::from_url(Some("sqlite:///subvenciones.db")).unwrap(), sqlite("subvenciones.db"));
    assert_eq!(StoreBackend::from_url(Some("sqlite:////var/lib/s.db")).unwrap(), sqlite("/var/lib/s.db"));
    assert_eq!(StoreBackend::from_url(Some("sqlite://data/s.db")).unwrap(), sqlite("data/s.db"));
    assert_eq!(StoreBackend::from_url(Some("sqlite:s.db")).unwrap(), sqlite("s.db"));
    assert_eq!(StoreBackend::from_url(Some("./s.db")).unwrap(), sqlite("./s.db"));
  }

  #[test]
  fn rejects_empty_sqlite_path_and_unknown_schemes() {
    assert_eq!(StoreBackend::from_url(Some("sqlite:///")), Err(BackendError::EmptyPath));
    assert_eq!(
      StoreBackend::from_url(Some("mysql://db/s")),
      Err(BackendError::UnsupportedScheme("mysql".to_owned()))
    );
  }

  #[test]
  fn describe_hides_credentials() {
    let pg = StoreBackend::from_url(Some("postgresql://admin:hunter2@db/s")).unwrap();
    assert!(!pg.describe().contains("hunter2"));
  }
}
