//! kabu-server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens the
//! SQLite store, checks it answers, and serves the JSON API until Ctrl-C.
//!
//! ```sh
//! cargo run -p kabu-server -- --config config.toml
//! ```

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use kabu_core::store::PlantStore as _;
use kabu_server::ServerConfig;
use kabu_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Kabu plant inventory server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Create the database schema, then exit without serving.
  #[arg(long)]
  init_only: bool,
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

  let server_cfg = ServerConfig::load(&cli.config)
    .with_context(|| format!("failed to load configuration from {:?}", cli.config))?;

  // Open SQLite store.
  let store_path = server_cfg.resolved_database_path();
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;
  store.ping().await.context("store health check failed")?;
  tracing::info!(path = ?store_path, "store ready");

  if cli.init_only {
    store.close().await.context("failed to close store")?;
    return Ok(());
  }

  let store = Arc::new(store);
  let app = kabu_server::router(store.clone(), &server_cfg)?;
  let address = server_cfg.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  match Arc::try_unwrap(store) {
    Ok(store) => store.close().await.context("failed to close store")?,
    Err(_) => tracing::warn!("store still referenced at shutdown; dropping connection"),
  }
  tracing::info!("shut down cleanly");

  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(error = %e, "failed to listen for shutdown signal");
    std::future::pending::<()>().await;
  }
  tracing::info!("shutdown signal received");
}
