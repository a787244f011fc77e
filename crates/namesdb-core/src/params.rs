//! Request parameters as a multi-valued, key-ordered map.
//!
//! Query strings and JSON bodies both land here before the query builder
//! sees them. Nothing is validated beyond the allow-list: filter values are
//! opaque strings.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use serde_json::Value;

// ─── Reserved keys ───────────────────────────────────────────────────────────

pub const FULLTEXT: &str = "fulltext";
pub const MATCH_ALL: &str = "match_all";
pub const MODELS: &str = "models";
pub const SORT: &str = "sort";
pub const PAGE: &str = "page";
pub const LIMIT: &str = "limit";
pub const OFFSET: &str = "offset";
pub const PAD: &str = "pad";

/// Keys with builder-level meaning, always allowed.
pub const RESERVED: [&str; 4] = [FULLTEXT, MATCH_ALL, MODELS, SORT];

/// Keys that select a page rather than a result set.
pub const PAGING: [&str; 3] = [PAGE, LIMIT, OFFSET];

// ─── Params ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Params(BTreeMap<String, Vec<String>>);

impl Params {
  pub fn new() -> Self { Self::default() }

  /// Collect decoded `key=value` pairs; repeated keys accumulate.
  pub fn from_pairs<I, K, V>(pairs: I) -> Self
  where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
  {
    let mut params = Self::new();
    for (k, v) in pairs {
      params.push(k, v);
    }
    params
  }

  /// Add values from a JSON object body. Keys already present are kept as
  /// they are, so a query string wins over a body. Strings, numbers and
  /// booleans are accepted, alone or in arrays; anything else is skipped.
  pub fn merge_json(&mut self, body: &Value) {
    let Some(obj) = body.as_object() else { return };
    for (key, value) in obj {
      if self.0.contains_key(key) {
        continue;
      }
      let values: Vec<String> = match value {
        Value::Array(items) => items.iter().filter_map(scalar).collect(),
        other => scalar(other).into_iter().collect(),
      };
      if !values.is_empty() {
        self.0.insert(key.clone(), values);
      }
    }
  }

  pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
    self.0.entry(key.into()).or_default().push(value.into());
  }

  pub fn set(&mut self, key: impl Into<String>, values: Vec<String>) {
    self.0.insert(key.into(), values);
  }

  pub fn contains(&self, key: &str) -> bool { self.0.contains_key(key) }

  pub fn get(&self, key: &str) -> Option<&[String]> {
    self.0.get(key).map(Vec::as_slice)
  }

  pub fn first(&self, key: &str) -> Option<&str> {
    self.get(key).and_then(|v| v.first()).map(String::as_str)
  }

  pub fn remove(&mut self, key: &str) -> Option<Vec<String>> {
    self.0.remove(key)
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
    self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
  }

  pub fn keys(&self) -> impl Iterator<Item = &str> {
    self.0.keys().map(String::as_str)
  }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  /// A copy holding only allow-listed keys (plus `page`).
  pub fn sanitize<'a>(&self, allowlist: impl IntoIterator<Item = &'a str>) -> Self {
    let allowed: BTreeSet<&str> =
      allowlist.into_iter().chain(std::iter::once(PAGE)).collect();
    Self(
      self
        .0
        .iter()
        .filter(|(k, _)| allowed.contains(k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect(),
    )
  }

  /// Parse an integer param, treating junk as absent.
  pub fn int<T: std::str::FromStr>(&self, key: &str) -> Option<T> {
    self.first(key).and_then(|v| v.trim().parse().ok())
  }

  /// A boolean flag: present and not `false`/`0`/empty.
  pub fn flag(&self, key: &str) -> bool {
    self
      .first(key)
      .is_some_and(|v| !matches!(v.trim(), "" | "0" | "false" | "False"))
  }

  /// `key=value` pairs for echoing back in page URLs, paging keys removed.
  pub fn echo_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
    self
      .0
      .iter()
      .filter(|(k, _)| !PAGING.contains(&k.as_str()))
      .flat_map(|(k, vs)| vs.iter().map(move |v| (k.as_str(), v.as_str())))
  }
}

fn scalar(value: &Value) -> Option<String> {
  match value {
    Value::String(s) => Some(s.clone()),
    Value::Number(n) => Some(n.to_string()),
    Value::Bool(b) => Some(b.to_string()),
    _ => None,
  }
}
