//! Result assembler: one engine reply in, one paged envelope out.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value, json};
use url::Url;

use crate::{
  Result,
  docstore::{Bucket, Hit, SearchResponse},
  format::Formatter,
  pagination::page_number,
  params::{self, Params},
};

/// Aggregation buckets by field.
pub type Aggregations = BTreeMap<String, Vec<Bucket>>;

/// An executed search, with paging worked out.
#[derive(Debug, Clone)]
pub struct SearchResults {
  /// The sanitized params the search ran with.
  pub params:       Params,
  /// The query DSL document that was sent, without paging.
  pub query:        Value,
  pub total:        u64,
  pub limit:        u64,
  pub offset:       u64,
  pub prev_offset:  Option<u64>,
  pub next_offset:  Option<u64>,
  pub page_size:    u64,
  pub this_page:    u64,
  /// First row of the current page, for padding.
  pub page_start:   u64,
  /// First row after the current page, for padding.
  pub page_next:    u64,
  pub hits:         Vec<Hit>,
  pub aggregations: Aggregations,
}

impl SearchResults {
  pub fn new(
    params: Params,
    query: Value,
    response: SearchResponse,
    limit: u64,
    offset: u64,
  ) -> Self {
    let total = response.hits.total.value();
    let this_page = page_number(limit, offset);
    let aggregations = unwrap_aggregations(response.aggregations.as_ref());
    Self {
      params,
      query,
      total,
      limit,
      offset,
      prev_offset: offset.checked_sub(limit),
      next_offset: offset.checked_add(limit).filter(|next| *next < total),
      page_size: limit,
      this_page,
      page_start: (this_page - 1).saturating_mul(limit),
      page_next: this_page.saturating_mul(limit),
      hits: response.hits.hits,
      aggregations,
    }
  }

  /// Build the public envelope.
  ///
  /// `request_url` is the inbound request's URL; page links keep its scheme,
  /// host and path and replace its query. With `pad`, placeholder `{"n": i}`
  /// objects stand in for every row outside the current page.
  pub fn to_envelope(
    &self,
    request_url: &Url,
    formatter: &Formatter,
    pad: bool,
  ) -> Result<Envelope> {
    let mut objects = Vec::new();
    if pad {
      let before = self.page_start.min(self.total);
      objects.extend((0..before).map(|n| json!({ "n": n })));
    }
    for hit in &self.hits {
      if let Some(object) = formatter.list_item(hit)? {
        objects.push(object);
      }
    }
    if pad {
      objects.extend((self.page_next..self.total).map(|n| json!({ "n": n })));
    }

    let page_api = |offset: Option<u64>| {
      offset.map(|o| page_url(request_url, &self.params, self.limit, o))
    };

    Ok(Envelope {
      total: self.total,
      limit: self.limit,
      offset: self.offset,
      prev_offset: self.prev_offset,
      next_offset: self.next_offset,
      page_size: self.page_size,
      this_page: self.this_page,
      num_this_page: self.hits.len(),
      prev_api: page_api(self.prev_offset),
      next_api: page_api(self.next_offset),
      objects,
      query: self.query.clone(),
      aggregations: self.aggregations.clone(),
    })
  }
}

/// The JSON shape of a page of results.
#[derive(Debug, Clone, Serialize)]
pub struct Envelope {
  pub total:         u64,
  pub limit:         u64,
  pub offset:        u64,
  pub prev_offset:   Option<u64>,
  pub next_offset:   Option<u64>,
  pub page_size:     u64,
  pub this_page:     u64,
  pub num_this_page: usize,
  pub prev_api:      Option<String>,
  pub next_api:      Option<String>,
  pub objects:       Vec<Value>,
  pub query:         Value,
  pub aggregations:  Aggregations,
}

/// `request_url` with its query replaced by `params` plus `limit`/`offset`.
pub fn page_url(
  request_url: &Url,
  params: &Params,
  limit: u64,
  offset: u64,
) -> String {
  let mut url = request_url.clone();
  url.set_query(None);
  url.set_fragment(None);
  url
    .query_pairs_mut()
    .extend_pairs(params.echo_pairs())
    .append_pair(params::LIMIT, &limit.to_string())
    .append_pair(params::OFFSET, &offset.to_string());
  url.into()
}

/// Pull every `buckets` list out of an aggregation tree, keyed by the
/// aggregation's own name. Wrapper aggregations (`global`, `filter`) are
/// walked through.
pub fn unwrap_aggregations(raw: Option<&Map<String, Value>>) -> Aggregations {
  let mut out = Aggregations::new();
  if let Some(tree) = raw {
    collect_buckets(tree, &mut out);
  }
  out
}

fn collect_buckets(tree: &Map<String, Value>, out: &mut Aggregations) {
  for (name, agg) in tree {
    let Value::Object(body) = agg else { continue };
    match body.get("buckets") {
      Some(buckets) => {
        if let Ok(buckets) = serde_json::from_value(buckets.clone()) {
          out.insert(name.clone(), buckets);
        }
      }
      None => collect_buckets(body, out),
    }
  }
}
