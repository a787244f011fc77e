//! Connection settings for the outbound clients.

use serde::Deserialize;

fn default_timeout_secs() -> u64 { 10 }

fn default_elastic_url() -> String { "http://localhost:9200".into() }

/// Elasticsearch connection.
#[derive(Debug, Clone, Deserialize)]
pub struct ElasticConfig {
  /// Base URL of the cluster, e.g. `http://localhost:9200`.
  #[serde(default = "default_elastic_url")]
  pub url:          String,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
  #[serde(default)]
  pub username:     Option<String>,
  #[serde(default)]
  pub password:     Option<String>,
}

impl Default for ElasticConfig {
  fn default() -> Self {
    Self {
      url:          default_elastic_url(),
      timeout_secs: default_timeout_secs(),
      username:     None,
      password:     None,
    }
  }
}

/// Digital repository API, queried for objects linked to a person.
///
/// Both URLs are templates; `{id}` is replaced with the person's `nr_id`.
#[derive(Debug, Clone, Deserialize)]
pub struct DdrConfig {
  pub api_url:      String,
  pub ui_url:       String,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
  #[serde(default)]
  pub username:     Option<String>,
  #[serde(default)]
  pub password:     Option<String>,
}
