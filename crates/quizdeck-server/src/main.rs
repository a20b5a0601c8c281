//! quizdeck server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens an
//! in-process SQLite store, and serves the trivia API over HTTP.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use chrono::Duration;
use clap::Parser;
use quizdeck_api::{ApiOptions, ApiState, api_router};
use quizdeck_core::store::GameStore as _;
use quizdeck_server::{ServerConfig, openai::OpenAiGenerator};
use quizdeck_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "quizdeck trivia server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("QUIZDECK"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let store = SqliteStore::open(&server_cfg.store_path)
    .await
    .with_context(|| {
      format!("failed to open store at {:?}", server_cfg.store_path)
    })?;

  // Hourly sweep of expired bearer tokens.
  {
    let store = store.clone();
    tokio::spawn(async move {
      let mut ticker =
        tokio::time::interval(std::time::Duration::from_secs(3600));
      loop {
        ticker.tick().await;
        match store.purge_expired_tokens(chrono::Utc::now()).await {
          Ok(0) => {}
          Ok(purged) => tracing::info!(purged, "expired tokens removed"),
          Err(e) => tracing::warn!(error = %e, "token purge failed"),
        }
      }
    });
  }

  let generator = OpenAiGenerator::new(
    server_cfg.openai_api_key.clone(),
    server_cfg.openai_model.clone(),
    server_cfg.openai_base_url.clone(),
  );

  let state = ApiState::new(
    Arc::new(store),
    Arc::new(generator),
    ApiOptions {
      token_ttl:         Duration::days(server_cfg.token_ttl_days),
      grading_threshold: server_cfg.grading_threshold,
      points:            server_cfg.points,
    },
  );

  let app = api_router(state).layer(TraceLayer::new_for_http());
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
