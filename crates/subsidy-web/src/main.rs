//! subsidy-server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), opens the storage
//! backend selected by `database_url` / `DATABASE_URL`, and serves the registry
//! over HTTP.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::Parser;
use subsidy_core::RequestStore;
use subsidy_store_postgres::PgStore;
use subsidy_store_sqlite::SqliteStore;
use subsidy_web::{AppState, ServerConfig, StoreBackend};
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Agricultural subsidy request registry")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("SUBSIDY"))
    .build()
    .context("failed to read config file")?;

  let mut server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  if server_cfg.database_url.is_none() {
    server_cfg.database_url = std::env::var("DATABASE_URL").ok();
  }

  let backend = StoreBackend::from_url(server_cfg.database_url.as_deref())
    .context("invalid database url")?;
  tracing::info!(backend = %backend.describe(), "opening request store");

  match backend {
    StoreBackend::Sqlite(path) => {
      let path = expand_tilde(&path);
      let store = SqliteStore::open(&path)
        .await
        .with_context(|| format!("failed to open store at {path:?}"))?;
      serve(store, server_cfg).await
    }
    StoreBackend::Postgres(url) => {
      let store = PgStore::connect(&url)
        .await
        .context("failed to connect to PostgreSQL")?;
      serve(store, server_cfg).await
    }
  }
}

async fn serve<S>(store: S, server_cfg: ServerConfig) -> anyhow::Result<()>
where
  S: RequestStore + Clone + 'static,
{
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);
  let app = subsidy_web::router(AppState::new(store, server_cfg));

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
