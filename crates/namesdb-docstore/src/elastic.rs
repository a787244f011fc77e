//! [`ElasticDocstore`]: the Elasticsearch implementation of [`Docstore`].

use std::time::Duration;

use namesdb_core::docstore::{Docstore, Hit, SearchRequest, SearchResponse};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::{Error, ElasticConfig, Result};

/// Read-only client for one Elasticsearch cluster.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based and pools
/// connections.
#[derive(Debug, Clone)]
pub struct ElasticDocstore {
  client:   Client,
  base:     Url,
  username: Option<String>,
  password: Option<String>,
}

/// The bits of `/_cluster/health` worth logging.
#[derive(Debug, Clone, Deserialize)]
pub struct ClusterHealth {
  pub cluster_name: String,
  pub status:       String,
}

/// A get-by-id reply.
#[derive(Deserialize)]
struct GetReply {
  #[serde(default)]
  found: bool,
  #[serde(flatten)]
  hit:   Hit,
}

/// A 404 from the get endpoint: either a missing document (`found: false`)
/// or a missing index, which has no `found` key.
#[derive(Deserialize)]
struct Missing {
  found: bool,
}

impl ElasticDocstore {
  pub fn new(config: &ElasticConfig) -> Result<Self> {
    let base = Url::parse(&config.url)?;
    if base.cannot_be_a_base() {
      let err = url::ParseError::RelativeUrlWithCannotBeABaseBase;
      return Err(Error::Url(err));
    }
    let client = Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()?;
    Ok(Self {
      client,
      base,
      username: config.username.clone(),
      password: config.password.clone(),
    })
  }

  /// The base URL with `segments` appended, each percent-encoded.
  fn endpoint(&self, segments: &[&str]) -> Url {
    let mut url = self.base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
      path.pop_if_empty().extend(segments);
    }
    url
  }

  fn auth(&self, req: RequestBuilder) -> RequestBuilder {
    match &self.username {
      Some(user) => req.basic_auth(user, self.password.as_ref()),
      None => req,
    }
  }

  /// `GET /_cluster/health`
  pub async fn health(&self) -> Result<ClusterHealth> {
    let url = self.endpoint(&["_cluster", "health"]);
    let resp = self.auth(self.client.get(url)).send().await?;
    let body = success(resp).await?.text().await?;
    Ok(serde_json::from_str(&body)?)
  }
}

/// Pass a 2xx response through; turn anything else into [`Error::Status`].
async fn success(resp: Response) -> Result<Response> {
  let status = resp.status();
  if status.is_success() {
    return Ok(resp);
  }
  let body = resp.text().await.unwrap_or_default();
  Err(Error::Status { status: status.as_u16(), body })
}

impl Docstore for ElasticDocstore {
  type Error = Error;

  /// `POST /{indices}/_search`
  async fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
    let indices = request.indices.join(",");
    let url = self.endpoint(&[indices.as_str(), "_search"]);
    debug!(%url, "search");
    let resp = self
      .auth(self.client.post(url))
      .json(&request.body)
      .send()
      .await?;
    let body = success(resp).await?.text().await?;
    Ok(serde_json::from_str(&body)?)
  }

  /// `GET /{index}/_doc/{id}`. A missing document is `None`; a missing
  /// index is an error.
  async fn get(&self, index: &str, id: &str) -> Result<Option<Hit>> {
    let url = self.endpoint(&[index, "_doc", id]);
    debug!(%url, "get");
    let resp = self.auth(self.client.get(url)).send().await?;
    if resp.status() == StatusCode::NOT_FOUND {
      let body = resp.text().await?;
      return match serde_json::from_str::<Missing>(&body) {
        Ok(Missing { found: false }) => Ok(None),
        _ => Err(Error::Status { status: 404, body }),
      };
    }
    let body = success(resp).await?.text().await?;
    let reply: GetReply = serde_json::from_str(&body)?;
    Ok(reply.found.then_some(reply.hit))
  }
}
