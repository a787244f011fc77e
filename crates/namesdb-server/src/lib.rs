//! Server wiring for the Names Registry API: configuration and the
//! top-level router.

use std::path::Path;

use anyhow::Context as _;
use axum::Router;
use config::{Environment, Source};
use namesdb_api::{ApiSettings, AppState, api_router};
use namesdb_core::{docstore::Docstore, objects::ObjectSource};
use namesdb_docstore::{DdrConfig, ElasticConfig};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

/// Prefix of environment variables overriding the config file, e.g.
/// `NAMESDB_PORT` or `NAMESDB_ELASTICSEARCH__URL`.
pub const ENV_PREFIX: &str = "NAMESDB";

// ─── Configuration ───────────────────────────────────────────────────────────

fn default_host() -> String { "127.0.0.1".into() }
fn default_port() -> u16 { 8000 }
fn default_index_prefix() -> String { "names".into() }
fn default_page_size() -> u64 { 25 }
fn default_max_limit() -> u64 { 1000 }

/// Runtime server configuration, deserialised from `config.toml` and the
/// environment.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:          String,
  #[serde(default = "default_port")]
  pub port:          u16,
  #[serde(default = "default_index_prefix")]
  pub index_prefix:  String,
  #[serde(default = "default_page_size")]
  pub page_size:     u64,
  /// Engine result window per request.
  #[serde(default = "default_max_limit")]
  pub max_limit:     u64,
  #[serde(default)]
  pub elasticsearch: ElasticConfig,
  pub ddr:           DdrConfig,
}

impl ServerConfig {
  /// Read `path` if it exists, then apply `NAMESDB_*` overrides.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    Self::from_sources(
      config::File::from(path).required(false),
      environment(),
    )
  }

  fn from_sources<F>(file: F, env: Environment) -> anyhow::Result<Self>
  where
    F: Source + Send + Sync + 'static,
  {
    config::Config::builder()
      .add_source(file)
      .add_source(env)
      .build()
      .context("failed to read configuration")?
      .try_deserialize()
      .context("failed to deserialise ServerConfig")
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn api_settings(&self) -> ApiSettings {
    ApiSettings {
      index_prefix: self.index_prefix.clone(),
      page_size:    self.page_size,
      max_limit:    self.max_limit,
    }
  }
}

fn environment() -> Environment {
  Environment::with_prefix(ENV_PREFIX)
    .prefix_separator("_")
    .separator("__")
    .try_parsing(true)
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// The API router with request tracing.
pub fn app<D, O>(state: AppState<D, O>) -> Router
where
  D: Docstore + 'static,
  O: ObjectSource + 'static,
{
  api_router(state).layer(TraceLayer::new_for_http())
}
