//! The `Docstore` trait and the engine request/response shapes.
//!
//! The trait is implemented by search engine clients (e.g. the Elasticsearch
//! client in `namesdb-docstore`). Query building, pagination and formatting
//! depend on this abstraction only.

use std::{collections::BTreeMap, future::Future};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ─── Request ─────────────────────────────────────────────────────────────────

/// A fully-built query, ready to send.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchRequest {
  /// Indices to search; sent comma-joined.
  pub indices: Vec<String>,
  /// Query DSL document (`query`, `sort`, `_source`, `aggs`, `highlight`,
  /// `from`, `size`).
  pub body:    Value,
}

// ─── Response ────────────────────────────────────────────────────────────────

/// The engine's reply to a search, as far as this crate reads it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
  pub hits:         Hits,
  /// Raw aggregation results; unwrapped by
  /// [`SearchResults`](crate::results::SearchResults).
  #[serde(default)]
  pub aggregations: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Hits {
  #[serde(default)]
  pub total: Total,
  #[serde(default)]
  pub hits:  Vec<Hit>,
}

/// Match count; older engines send a bare number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Total {
  Count(u64),
  Object { value: u64 },
}

impl Default for Total {
  fn default() -> Self { Self::Count(0) }
}

impl Total {
  pub fn value(self) -> u64 {
    match self {
      Self::Count(n) | Self::Object { value: n } => n,
    }
  }
}

/// One matching document. Also the shape of a get-by-id reply.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Hit {
  #[serde(rename = "_index")]
  pub index:     String,
  #[serde(rename = "_id")]
  pub id:        String,
  #[serde(rename = "_source", default)]
  pub source:    Map<String, Value>,
  /// Highlight fragments by field.
  #[serde(default)]
  pub highlight: BTreeMap<String, Vec<String>>,
}

/// A terms aggregation bucket, passed through to clients unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
  pub key:       Value,
  pub doc_count: u64,
}

impl Bucket {
  /// The bucket key as text (keyword keys are strings already).
  pub fn key_str(&self) -> String {
    match &self.key {
      Value::String(s) => s.clone(),
      other => other.to_string(),
    }
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Read-only access to the document store.
///
/// Implementations are created once at startup and shared between requests;
/// they must be safe for concurrent use. No method retries: a failed engine
/// call is returned to the caller as-is.
pub trait Docstore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Run a search.
  fn search<'a>(
    &'a self,
    request: &'a SearchRequest,
  ) -> impl Future<Output = Result<SearchResponse, Self::Error>> + Send + 'a;

  /// Fetch one document by id. Returns `None` if it does not exist.
  fn get<'a>(
    &'a self,
    index: &'a str,
    id: &'a str,
  ) -> impl Future<Output = Result<Option<Hit>, Self::Error>> + Send + 'a;
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn response_parses_object_total_and_highlights() {
    let raw = json!({
      "took": 3,
      "hits": {
        "total": { "value": 2, "relation": "eq" },
        "hits": [
          {
            "_index": "namesperson",
            "_id": "88922/nr1",
            "_source": { "nr_id": "88922/nr1" },
            "highlight": { "family_name": ["<em>Tanaka</em>"] }
          },
          { "_index": "namesperson", "_id": "88922/nr2" }
        ]
      },
      "aggregations": { "gender": { "buckets": [] } }
    });
    let resp: SearchResponse = serde_json::from_value(raw).unwrap();
    assert_eq!(resp.hits.total.value(), 2);
    assert_eq!(resp.hits.hits.len(), 2);
    assert_eq!(resp.hits.hits[0].highlight["family_name"], ["<em>Tanaka</em>"]);
    assert!(resp.hits.hits[1].source.is_empty());
    assert!(resp.aggregations.is_some());
  }

  #[test]
  fn response_parses_legacy_numeric_total() {
    let raw = json!({ "hits": { "total": 7, "hits": [] } });
    let resp: SearchResponse = serde_json::from_value(raw).unwrap();
    assert_eq!(resp.hits.total.value(), 7);
    assert!(resp.aggregations.is_none());
  }

  #[test]
  fn bucket_key_str_handles_numbers() {
    let b = Bucket { key: json!(1921), doc_count: 4 };
    assert_eq!(b.key_str(), "1921");
    let b = Bucket { key: json!("M"), doc_count: 4 };
    assert_eq!(b.key_str(), "M");
  }
}
