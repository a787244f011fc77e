//! namesdb-server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) plus `NAMESDB_*`
//! environment overrides, checks the field catalog and the search engine,
//! and serves the JSON API over HTTP.
//!
//! ```text
//! cargo run -p namesdb-server -- --config config.toml
//! NAMESDB_ELASTICSEARCH__URL=http://es:9200 cargo run -p namesdb-server -- --check
//! ```

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use namesdb_api::AppState;
use namesdb_core::catalog;
use namesdb_docstore::{DdrClient, ElasticDocstore};
use namesdb_server::ServerConfig;
use tokio::net::TcpListener;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Names Registry search API")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Check that the search engine answers, then exit.
  #[arg(long)]
  check: bool,
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

  let server_cfg = ServerConfig::load(&cli.config)
    .with_context(|| format!("failed to load {:?}", cli.config))?;

  catalog::validate_all().context("field catalog is inconsistent")?;

  let docstore = ElasticDocstore::new(&server_cfg.elasticsearch)
    .context("failed to build Elasticsearch client")?;

  match docstore.health().await {
    Ok(health) => info!(
      cluster = %health.cluster_name,
      status = %health.status,
      "connected to Elasticsearch"
    ),
    Err(e) if cli.check => {
      return Err(e).context("Elasticsearch health check failed");
    }
    Err(e) => warn!(error = %e, "Elasticsearch is not answering yet"),
  }
  if cli.check {
    return Ok(());
  }

  let ddr = DdrClient::new(&server_cfg.ddr)
    .context("failed to build DDR client")?;

  let state = AppState::new(docstore, ddr, server_cfg.api_settings());
  let app = namesdb_server::app(state);
  let address = server_cfg.address();

  info!(index_prefix = %server_cfg.index_prefix, "Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
