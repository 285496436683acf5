//! acorn-bff server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), layers `ACORN_*`
//! environment variables on top, and serves one portal's BFF over HTTP.

use std::{path::PathBuf, time::Duration};

use acorn_bff::{AppState, Portal, ServerConfig};
use acorn_upstream::HttpUpstream;
use anyhow::Context as _;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Acorn portal backend-for-frontend")]
struct Cli {
  /// Path to the TOML configuration file. Missing files are ignored.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Which portal to serve. Overrides the configuration file.
  #[arg(long, value_enum)]
  portal: Option<Portal>,
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

  let mut server_cfg =
    ServerConfig::load(&cli.config).context("failed to load configuration")?;
  if let Some(portal) = cli.portal {
    server_cfg.portal = portal;
  }

  tokio::fs::create_dir_all(&server_cfg.upload_dir)
    .await
    .with_context(|| format!("failed to create upload dir {:?}", server_cfg.upload_dir))?;

  let upstream = HttpUpstream::new(
    server_cfg.upstream_url(),
    Duration::from_secs(server_cfg.upstream_timeout_secs),
  )
  .context("failed to build upstream client")?;

  let address = server_cfg.address();
  tracing::info!(
    portal = %server_cfg.portal,
    upstream = %upstream.base_url(),
    "starting BFF"
  );

  let app = acorn_bff::router(AppState::new(upstream, server_cfg));

  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;
  tracing::info!("Listening on http://{address}");

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
