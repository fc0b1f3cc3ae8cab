//! nippo-server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens the
//! configured report store once, and serves the JSON API under `/api`.
//!
//! # Credential encoding
//!
//! To produce the `gcp_encoded` value for a deployment that cannot ship
//! `secrets.json`:
//!
//! ```
//! cargo run -p nippo-server -- --encode-credential secrets.json
//! ```

mod config;

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use clap::Parser;
use nippo_core::store::ReportStore;
use nippo_sheets::{ServiceAccountKey, SheetsStore, credentials};
use nippo_store_sqlite::SqliteSheet;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::config::{Backend, ServerConfig, expand_tilde};

#[derive(Parser)]
#[command(author, version, about = "Nippo daily report server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Print the base64 form of a service-account key file and exit.
  #[arg(long, value_name = "KEY_FILE")]
  encode_credential: Option<PathBuf>,
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

  // Helper mode: encode a key file and exit.
  if let Some(path) = cli.encode_credential {
    let bytes = std::fs::read(&path).with_context(|| format!("failed to read {path:?}"))?;
    ServiceAccountKey::from_json(&bytes).context("not a service-account key")?;
    println!("{}", STANDARD.encode(bytes));
    return Ok(());
  }

  let server_cfg = config::load(&cli.config).context("failed to load configuration")?;

  match server_cfg.backend {
    Backend::Sheets => {
      let key = credentials::provision(
        &server_cfg.credentials_path,
        server_cfg.gcp_encoded.as_deref(),
      )
      .context("no usable credential")?;
      let store = SheetsStore::connect(key, server_cfg.sheets())
        .await
        .context("failed to connect to the report spreadsheet")?;
      serve(store, &server_cfg).await
    }
    Backend::Sqlite => {
      let path = expand_tilde(&server_cfg.sqlite_path);
      if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
          .with_context(|| format!("failed to create {parent:?}"))?;
      }
      let store = SqliteSheet::open(&path)
        .await
        .with_context(|| format!("failed to open store at {path:?}"))?;
      serve(store, &server_cfg).await
    }
  }
}

async fn serve<S>(store: S, server_cfg: &ServerConfig) -> anyhow::Result<()>
where
  S: ReportStore + 'static,
{
  let app = axum::Router::new()
    .nest("/api", nippo_api::api_router(Arc::new(store)))
    .layer(TraceLayer::new_for_http());
  let address = server_cfg.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
