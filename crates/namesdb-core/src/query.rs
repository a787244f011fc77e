//! Query builder: request params in, engine query DSL out.
//!
//! [`Searcher::prepare`] sanitizes a [`Params`] map against a
//! [`SearchConfig`] and records a typed [`SearchQuery`].
//! [`Searcher::execute`] renders it, sends it to a [`Docstore`] and wraps
//! the reply in [`SearchResults`].
//!
//! Clause selection, in precedence order:
//!
//! 1. `match_all` present: an unconditioned match.
//! 2. `fulltext` present: one `query_string` over the full-text fields,
//!    terms ANDed, wildcard analysis and leading wildcards disabled.
//! 3. neither: no primary clause, only filters.
//!
//! Every other allow-listed param with a value becomes an exact-match
//! filter. Term aggregations always see the filtered set but never the
//! primary clause; with a `fulltext` clause they move under a `global`
//! aggregation carrying the filters on their own.

use serde_json::{Map, Value, json};
use tracing::debug;

use crate::{
  Error, Model, Result,
  catalog::catalog,
  docstore::{Docstore, SearchRequest},
  params::{self, Params},
  results::SearchResults,
};

/// Max buckets per terms aggregation.
pub const AGG_SIZE: u64 = 1000;
/// Highlight fragment length, in characters.
pub const FRAGMENT_SIZE: u64 = 50;
/// Name of the `global` aggregation used alongside a full-text clause.
pub const GLOBAL_AGG: &str = "_facets";
/// Name of the filter sub-aggregation under [`GLOBAL_AGG`].
pub const FILTERED_AGG: &str = "filtered";

// ─── Configuration ───────────────────────────────────────────────────────────

/// Per-endpoint query settings.
#[derive(Debug, Clone, Default)]
pub struct SearchConfig {
  /// Index name prefix, for resolving a `models` param.
  pub index_prefix:     String,
  /// Models a `models` param may choose from.
  pub models:           Vec<Model>,
  /// Indices searched when no `models` param narrows them.
  pub indices:          Vec<String>,
  /// Filter params accepted besides the reserved keys.
  pub allowlist:        Vec<String>,
  /// Projection requested from the engine.
  pub source_fields:    Vec<String>,
  /// Fields searched by the `fulltext` param.
  pub fulltext_fields:  Vec<String>,
  /// Filter params rewritten to a flattened `<param>_id` field.
  pub nested:           Vec<String>,
  /// Filter params some model declares as a plain field. A param that is
  /// also in `nested` matches either field.
  pub declared:         Vec<String>,
  /// Fields with a terms aggregation.
  pub agg_fields:       Vec<String>,
  /// Fields with fragment highlighting.
  pub highlight_fields: Vec<String>,
  /// Order used when no `sort` param is given. Empty means relevance.
  pub default_sort:     Vec<SortSpec>,
}

impl SearchConfig {
  /// Search settings covering `models`, merged from their catalogs.
  pub fn for_models(index_prefix: &str, models: &[Model]) -> Self {
    let mut config = Self {
      index_prefix: index_prefix.to_owned(),
      models: models.to_vec(),
      indices: models.iter().map(|m| m.index_name(index_prefix)).collect(),
      fulltext_fields: vec![crate::record::FULLTEXT_FIELD.to_owned()],
      ..Self::default()
    };
    for model in models {
      let cat = catalog(*model);
      extend_unique(&mut config.allowlist, cat.filterable());
      extend_unique(&mut config.source_fields, cat.list_fields.iter().copied());
      extend_unique(&mut config.nested, cat.nested_filters.iter().copied());
      extend_unique(
        &mut config.declared,
        cat.filterable().filter(|f| !cat.nested_filters.contains(f)),
      );
      extend_unique(&mut config.agg_fields, cat.agg_fields.iter().copied());
      extend_unique(
        &mut config.highlight_fields,
        cat.highlight_fields.iter().copied(),
      );
    }
    config
  }

  /// Listing settings for one model: sorted by identifier, no facets and no
  /// highlighting.
  pub fn listing(index_prefix: &str, model: Model) -> Self {
    Self {
      agg_fields: Vec::new(),
      highlight_fields: Vec::new(),
      default_sort: vec![SortSpec::asc(model.id_field())],
      ..Self::for_models(index_prefix, &[model])
    }
  }

  /// Every key [`Searcher::prepare`] keeps.
  pub fn allowed_keys(&self) -> impl Iterator<Item = &str> {
    params::RESERVED
      .into_iter()
      .chain(self.allowlist.iter().map(String::as_str))
  }

  fn indices_for(&self, params: &Params) -> Vec<String> {
    let Some(values) = params.get(params::MODELS) else {
      return self.indices.clone();
    };
    let mut chosen = Vec::new();
    for name in values.iter().flat_map(|v| v.split(',')) {
      match Model::from_path(name.trim()) {
        Ok(model) if self.models.contains(&model) => {
          let index = model.index_name(&self.index_prefix);
          if !chosen.contains(&index) {
            chosen.push(index);
          }
        }
        _ => debug!(model = name, "ignoring unsearchable model"),
      }
    }
    if chosen.is_empty() { self.indices.clone() } else { chosen }
  }
}

fn extend_unique<'a>(
  target: &mut Vec<String>,
  items: impl IntoIterator<Item = &'a str>,
) {
  for item in items {
    if !target.iter().any(|t| t == item) {
      target.push(item.to_owned());
    }
  }
}

// ─── Clauses ─────────────────────────────────────────────────────────────────

/// One sort key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
  pub field:      String,
  pub descending: bool,
}

impl SortSpec {
  pub fn asc(field: &str) -> Self {
    Self { field: field.to_owned(), descending: false }
  }

  /// Parse `field` or `-field` (descending).
  pub fn parse(s: &str) -> Option<Self> {
    let s = s.trim();
    let (field, descending) = match s.strip_prefix('-') {
      Some(rest) => (rest, true),
      None => (s, false),
    };
    (!field.is_empty()).then(|| Self { field: field.to_owned(), descending })
  }

  fn to_json(&self) -> Value {
    let order = if self.descending { "desc" } else { "asc" };
    json!({ &self.field: { "order": order } })
  }
}

/// The mutually exclusive main clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Primary {
  MatchAll,
  QueryString { query: String, fields: Vec<String> },
}

impl Primary {
  fn to_json(&self) -> Value {
    match self {
      Self::MatchAll => json!({ "match_all": {} }),
      Self::QueryString { query, fields } => json!({
        "query_string": {
          "query": query,
          "fields": fields,
          "analyze_wildcard": false,
          "allow_leading_wildcard": false,
          "default_operator": "AND",
        }
      }),
    }
  }
}

/// An exact-match filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
  Term { field: String, value: String },
  /// Any of several values.
  Terms { field: String, values: Vec<String> },
  /// Any of several filters. Used when one param maps to different fields
  /// in different indices.
  AnyOf(Vec<Filter>),
}

impl Filter {
  fn matching(field: String, mut values: Vec<String>) -> Self {
    if values.len() == 1 {
      Self::Term { field, value: values.remove(0) }
    } else {
      Self::Terms { field, values }
    }
  }

  fn to_json(&self) -> Value {
    match self {
      Self::Term { field, value } => json!({ "term": { field: value } }),
      Self::Terms { field, values } => json!({ "terms": { field: values } }),
      Self::AnyOf(filters) => {
        let should: Vec<Value> = filters.iter().map(Self::to_json).collect();
        json!({ "bool": { "should": should, "minimum_should_match": 1 } })
      }
    }
  }
}

// ─── Prepared query ──────────────────────────────────────────────────────────

/// A sanitized, structured query.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
  /// The params the query was built from, after sanitizing.
  pub params:    Params,
  pub indices:   Vec<String>,
  pub source:    Vec<String>,
  pub sort:      Vec<SortSpec>,
  pub primary:   Option<Primary>,
  pub filters:   Vec<Filter>,
  pub aggs:      Vec<String>,
  pub highlight: Vec<String>,
}

impl SearchQuery {
  /// Build from params already run through [`Params::sanitize`].
  fn build(params: Params, config: &SearchConfig) -> Self {
    let indices = config.indices_for(&params);

    let sort = match params.get(params::SORT) {
      Some(values) => values
        .iter()
        .flat_map(|v| v.split(','))
        .filter_map(SortSpec::parse)
        .collect(),
      None => config.default_sort.clone(),
    };

    let fulltext = params
      .first(params::FULLTEXT)
      .map(str::trim)
      .filter(|q| !q.is_empty());
    let primary = if params.contains(params::MATCH_ALL) {
      Some(Primary::MatchAll)
    } else {
      fulltext.map(|q| Primary::QueryString {
        query:  q.to_owned(),
        fields: config.fulltext_fields.clone(),
      })
    };

    let mut filters = Vec::new();
    for (key, values) in params.iter() {
      if params::RESERVED.contains(&key) || key == params::PAGE {
        continue;
      }
      let values: Vec<String> = values
        .iter()
        .filter(|v| !v.is_empty())
        .cloned()
        .collect();
      if values.is_empty() {
        continue;
      }
      let nested = config.nested.iter().any(|n| n == key);
      let declared = config.declared.iter().any(|d| d == key);
      filters.push(match (nested, declared) {
        (true, true) => Filter::AnyOf(vec![
          Filter::matching(format!("{key}_id"), values.clone()),
          Filter::matching(key.to_owned(), values),
        ]),
        (true, false) => Filter::matching(format!("{key}_id"), values),
        (false, _) => Filter::matching(key.to_owned(), values),
      });
    }

    Self {
      indices,
      source: config.source_fields.clone(),
      sort,
      primary,
      filters,
      aggs: config.agg_fields.clone(),
      highlight: config.highlight_fields.clone(),
      params,
    }
  }

  fn has_fulltext(&self) -> bool {
    matches!(self.primary, Some(Primary::QueryString { .. }))
  }

  fn filter_clause(&self) -> Value {
    if self.filters.is_empty() {
      return json!({ "match_all": {} });
    }
    let filters: Vec<Value> = self.filters.iter().map(Filter::to_json).collect();
    json!({ "bool": { "filter": filters } })
  }

  fn query_clause(&self) -> Value {
    match (&self.primary, self.filters.is_empty()) {
      (None, true) => json!({ "match_all": {} }),
      (Some(primary), true) => primary.to_json(),
      (primary, false) => {
        let mut clause = Map::new();
        if let Some(primary) = primary {
          clause.insert("must".into(), json!([primary.to_json()]));
        }
        let filters: Vec<Value> =
          self.filters.iter().map(Filter::to_json).collect();
        clause.insert("filter".into(), Value::Array(filters));
        json!({ "bool": clause })
      }
    }
  }

  fn aggs_clause(&self) -> Option<Value> {
    if self.aggs.is_empty() {
      return None;
    }
    let terms: Map<String, Value> = self
      .aggs
      .iter()
      .map(|field| {
        let agg = json!({ "terms": { "field": field, "size": AGG_SIZE } });
        (field.clone(), agg)
      })
      .collect();
    if !self.has_fulltext() {
      return Some(Value::Object(terms));
    }
    Some(json!({
      GLOBAL_AGG: {
        "global": {},
        "aggs": {
          FILTERED_AGG: {
            "filter": self.filter_clause(),
            "aggs": terms,
          }
        }
      }
    }))
  }

  /// The query DSL document, without paging.
  pub fn to_body(&self) -> Value {
    let mut body = Map::new();
    body.insert("query".into(), self.query_clause());
    if !self.source.is_empty() {
      body.insert("_source".into(), json!(self.source));
    }
    if !self.sort.is_empty() {
      let sort: Vec<Value> = self.sort.iter().map(SortSpec::to_json).collect();
      body.insert("sort".into(), Value::Array(sort));
    }
    if let Some(aggs) = self.aggs_clause() {
      body.insert("aggs".into(), aggs);
    }
    if !self.highlight.is_empty() {
      let fields: Map<String, Value> = self
        .highlight
        .iter()
        .map(|f| (f.clone(), json!({ "fragment_size": FRAGMENT_SIZE })))
        .collect();
      // The query only touches `fulltext`; highlight the source fields
      // anyway.
      body.insert(
        "highlight".into(),
        json!({ "require_field_match": false, "fields": fields }),
      );
    }
    Value::Object(body)
  }

  /// A ready-to-send request for rows `offset..offset + limit`.
  pub fn request(&self, limit: u64, offset: u64) -> SearchRequest {
    let mut body = self.to_body();
    if let Value::Object(map) = &mut body {
      map.insert("from".into(), json!(offset));
      map.insert("size".into(), json!(limit));
    }
    SearchRequest { indices: self.indices.clone(), body }
  }
}

// ─── Searcher ────────────────────────────────────────────────────────────────

/// Two-phase search: [`prepare`](Self::prepare), then
/// [`execute`](Self::execute).
#[derive(Debug, Clone, Default)]
pub struct Searcher {
  prepared: Option<SearchQuery>,
}

impl Searcher {
  pub fn new() -> Self { Self::default() }

  /// Sanitize `params` and build the query. Unknown keys are dropped
  /// silently.
  pub fn prepare(&mut self, params: &Params, config: &SearchConfig) -> &SearchQuery {
    let sanitized = params.sanitize(config.allowed_keys());
    let query = SearchQuery::build(sanitized, config);
    debug!(
      indices = ?query.indices,
      filters = query.filters.len(),
      fulltext = query.has_fulltext(),
      "prepared search"
    );
    self.prepared.insert(query)
  }

  pub fn query(&self) -> Option<&SearchQuery> { self.prepared.as_ref() }

  /// Run the prepared query for rows `offset..offset + limit`.
  ///
  /// Fails with [`Error::UnpreparedQuery`] when nothing was prepared. Engine
  /// failures come back as [`Error::Docstore`].
  pub async fn execute<D: Docstore>(
    &self,
    store: &D,
    limit: u64,
    offset: u64,
  ) -> Result<SearchResults> {
    let query = self.prepared.as_ref().ok_or(Error::UnpreparedQuery)?;
    let request = query.request(limit, offset);
    debug!(indices = ?request.indices, body = %request.body, "executing search");
    let response = store
      .search(&request)
      .await
      .map_err(|e| Error::Docstore(Box::new(e)))?;
    Ok(SearchResults::new(
      query.params.clone(),
      query.to_body(),
      response,
      limit,
      offset,
    ))
  }
}

#[cfg(test)]
mod tests;
