//! Tests for the query builder.

use std::{convert::Infallible, sync::Mutex};

use serde_json::{Value, json};

use super::*;
use crate::docstore::{Hit, SearchResponse};

// ─── Fixtures ────────────────────────────────────────────────────────────────

fn camp_config() -> SearchConfig {
  SearchConfig {
    indices: vec!["namesperson".into()],
    allowlist: vec!["m_camp".into(), "gender".into()],
    fulltext_fields: vec!["fulltext".into()],
    ..SearchConfig::default()
  }
}

fn prepare(pairs: &[(&str, &str)], config: &SearchConfig) -> SearchQuery {
  let params = Params::from_pairs(pairs.iter().copied());
  Searcher::new().prepare(&params, config).clone()
}

/// Stub engine that records what it is asked and answers with `reply`.
struct Recorder {
  seen:  Mutex<Vec<SearchRequest>>,
  reply: Value,
}

impl Recorder {
  fn new(reply: Value) -> Self { Self { seen: Mutex::new(Vec::new()), reply } }
}

impl Docstore for Recorder {
  type Error = Infallible;

  async fn search(
    &self,
    request: &SearchRequest,
  ) -> Result<SearchResponse, Infallible> {
    self.seen.lock().unwrap().push(request.clone());
    Ok(serde_json::from_value(self.reply.clone()).unwrap())
  }

  async fn get(
    &self,
    _index: &str,
    _id: &str,
  ) -> Result<Option<Hit>, Infallible> {
    Ok(None)
  }
}

// ─── Sanitizing ──────────────────────────────────────────────────────────────

#[test]
fn unknown_keys_never_reach_the_query() {
  let q = prepare(
    &[("fulltext", "tanaka"), ("utm_campaign", "spring"), ("gender", "F")],
    &camp_config(),
  );
  assert!(!q.params.contains("utm_campaign"));
  let body = q.request(10, 0).body.to_string();
  assert!(!body.contains("utm_campaign"));
  assert!(!body.contains("spring"));
}

#[test]
fn prepare_is_stable_under_resanitizing() {
  let config = camp_config();
  let first = prepare(&[("m_camp", "9-rohwer"), ("junk", "1")], &config);
  let second = Searcher::new().prepare(&first.params, &config).clone();
  assert_eq!(first, second);
}

// ─── Primary clause ──────────────────────────────────────────────────────────

#[test]
fn no_fulltext_and_no_filters_matches_everything() {
  let config = camp_config();
  let q = prepare(&[], &config);
  assert_eq!(q.primary, None);
  assert!(q.filters.is_empty());
  let req = q.request(25, 0);
  assert_eq!(req.indices, config.indices);
  assert_eq!(req.body["query"], json!({ "match_all": {} }));
}

#[test]
fn single_camp_filter() {
  let q = prepare(&[("m_camp", "9-rohwer")], &camp_config());
  assert_eq!(q.primary, None);
  assert_eq!(q.filters, [Filter::Term {
    field: "m_camp".into(),
    value: "9-rohwer".into(),
  }]);
  let body = q.request(25, 0).body;
  assert_eq!(
    body["query"],
    json!({ "bool": { "filter": [{ "term": { "m_camp": "9-rohwer" } }] } })
  );
  assert!(!body.to_string().contains("query_string"));
}

#[test]
fn fulltext_uses_strict_query_string() {
  let q = prepare(&[("fulltext", "tanaka yoshiko")], &camp_config());
  let body = q.request(25, 0).body;
  assert_eq!(
    body["query"],
    json!({
      "query_string": {
        "query": "tanaka yoshiko",
        "fields": ["fulltext"],
        "analyze_wildcard": false,
        "allow_leading_wildcard": false,
        "default_operator": "AND",
      }
    })
  );
}

#[test]
fn fulltext_list_collapses_to_first_value() {
  let q = prepare(
    &[("fulltext", "first"), ("fulltext", "second")],
    &camp_config(),
  );
  assert_eq!(
    q.primary,
    Some(Primary::QueryString {
      query:  "first".into(),
      fields: vec!["fulltext".into()],
    })
  );
}

#[test]
fn blank_fulltext_is_ignored() {
  let q = prepare(&[("fulltext", "  ")], &camp_config());
  assert_eq!(q.primary, None);
}

#[test]
fn match_all_beats_fulltext() {
  let q = prepare(&[("match_all", ""), ("fulltext", "tanaka")], &camp_config());
  assert_eq!(q.primary, Some(Primary::MatchAll));
}

#[test]
fn fulltext_and_filters_combine_in_bool() {
  let q = prepare(&[("fulltext", "sato"), ("gender", "M")], &camp_config());
  let body = q.request(25, 0).body;
  let query = &body["query"]["bool"];
  assert_eq!(query["must"][0]["query_string"]["query"], "sato");
  assert_eq!(query["filter"], json!([{ "term": { "gender": "M" } }]));
}

// ─── Filters ─────────────────────────────────────────────────────────────────

#[test]
fn nested_params_filter_on_flattened_id() {
  let config = SearchConfig::for_models("names", &[Model::Person]);
  let q = prepare(&[("facility", "9-rohwer")], &config);
  assert_eq!(q.filters, [Filter::Term {
    field: "facility_id".into(),
    value: "9-rohwer".into(),
  }]);
}

#[test]
fn shared_param_matches_nested_and_plain_fields_across_models() {
  let config = SearchConfig::for_models("names", &Model::SEARCHABLE);
  let q = prepare(&[("facility", "1-topaz")], &config);
  assert_eq!(q.filters, [Filter::AnyOf(vec![
    Filter::Term { field: "facility_id".into(), value: "1-topaz".into() },
    Filter::Term { field: "facility".into(), value: "1-topaz".into() },
  ])]);
  let camp = json!({
    "bool": {
      "should": [
        { "term": { "facility_id": "1-topaz" } },
        { "term": { "facility": "1-topaz" } },
      ],
      "minimum_should_match": 1
    }
  });
  let body = q.to_body();
  assert_eq!(body["query"]["bool"]["filter"][0], camp);

  let body = prepare(&[("facility", "1-topaz"), ("fulltext", "tanaka")], &config)
    .to_body();
  let filtered = &body["aggs"][GLOBAL_AGG]["aggs"][FILTERED_AGG]["filter"];
  assert_eq!(filtered["bool"]["filter"][0], camp);
}

#[test]
fn plain_field_models_keep_the_param_name() {
  for model in [Model::FarRecord, Model::WraRecord] {
    let config = SearchConfig::for_models("names", &[model]);
    let q = prepare(&[("facility", "9-rohwer")], &config);
    assert_eq!(q.filters, [Filter::Term {
      field: "facility".into(),
      value: "9-rohwer".into(),
    }]);
  }
}

#[test]
fn repeated_param_becomes_terms_filter() {
  let q = prepare(&[("gender", "F"), ("gender", "M")], &camp_config());
  assert_eq!(q.filters, [Filter::Terms {
    field:  "gender".into(),
    values: vec!["F".into(), "M".into()],
  }]);
  assert_eq!(
    q.request(25, 0).body["query"]["bool"]["filter"][0],
    json!({ "terms": { "gender": ["F", "M"] } })
  );
}

#[test]
fn empty_filter_values_are_skipped() {
  let q = prepare(&[("gender", ""), ("page", "2")], &camp_config());
  assert!(q.filters.is_empty());
}

// ─── Projection, sort, highlight, aggregations ───────────────────────────────

#[test]
fn catalog_config_projects_and_highlights() {
  let config = SearchConfig::for_models("names", &Model::SEARCHABLE);
  assert_eq!(config.indices, [
    "namesperson",
    "namesfarrecord",
    "nameswrarecord"
  ]);
  let body = prepare(&[("fulltext", "x")], &config).to_body();
  let source = body["_source"].as_array().unwrap();
  assert!(source.contains(&json!("preferred_name")));
  assert!(source.contains(&json!("far_record_id")));
  assert_eq!(
    body["highlight"]["fields"]["family_name"],
    json!({ "fragment_size": 50 })
  );
  assert_eq!(body["highlight"]["require_field_match"], false);
}

#[test]
fn sort_param_is_applied_in_order() {
  let q = prepare(&[("sort", "-birth_year,family_name")], &camp_config());
  assert_eq!(q.sort, [
    SortSpec { field: "birth_year".into(), descending: true },
    SortSpec::asc("family_name"),
  ]);
  assert_eq!(
    q.to_body()["sort"],
    json!([
      { "birth_year": { "order": "desc" } },
      { "family_name": { "order": "asc" } },
    ])
  );
}

#[test]
fn listing_sorts_by_identifier_without_facets() {
  let config = SearchConfig::listing("names", Model::FarRecord);
  let body = prepare(&[("match_all", "")], &config).to_body();
  assert_eq!(body["sort"], json!([{ "far_record_id": { "order": "asc" } }]));
  assert!(body.get("aggs").is_none());
  assert!(body.get("highlight").is_none());
}

#[test]
fn aggregations_are_plain_without_fulltext() {
  let config = SearchConfig::for_models("names", &[Model::Person]);
  let body = prepare(&[("gender", "F")], &config).to_body();
  assert_eq!(
    body["aggs"]["citizenship"],
    json!({ "terms": { "field": "citizenship", "size": 1000 } })
  );
  assert!(body["aggs"].get(GLOBAL_AGG).is_none());
}

#[test]
fn aggregations_skip_the_fulltext_clause() {
  let config = SearchConfig::for_models("names", &[Model::Person]);
  let body = prepare(&[("fulltext", "tanaka"), ("gender", "F")], &config)
    .to_body();
  let global = &body["aggs"][GLOBAL_AGG];
  assert_eq!(global["global"], json!({}));
  let filtered = &global["aggs"][FILTERED_AGG];
  assert_eq!(
    filtered["filter"],
    json!({ "bool": { "filter": [{ "term": { "gender": "F" } }] } })
  );
  assert_eq!(filtered["aggs"]["gender"]["terms"]["field"], "gender");
  assert!(!filtered.to_string().contains("tanaka"));
}

#[test]
fn models_param_narrows_indices() {
  let config = SearchConfig::for_models("names", &Model::SEARCHABLE);
  let q = prepare(&[("models", "farrecord,wrarecords")], &config);
  assert_eq!(q.indices, ["namesfarrecord", "nameswrarecord"]);
  let q = prepare(&[("models", "farpage"), ("models", "bogus")], &config);
  assert_eq!(q.indices, config.indices);
}

#[test]
fn paging_sets_from_and_size() {
  let req = prepare(&[], &camp_config()).request(10, 30);
  assert_eq!(req.body["from"], 30);
  assert_eq!(req.body["size"], 10);
}

// ─── Execution ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn execute_before_prepare_fails() {
  let store = Recorder::new(json!({ "hits": { "total": 0, "hits": [] } }));
  let err = Searcher::new().execute(&store, 10, 0).await.unwrap_err();
  assert!(matches!(err, Error::UnpreparedQuery));
  assert!(store.seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn execute_sends_the_prepared_query() {
  let store = Recorder::new(json!({
    "hits": {
      "total": { "value": 25 },
      "hits": [{ "_index": "namesperson", "_id": "88922/nr1",
                 "_source": { "nr_id": "88922/nr1" } }]
    }
  }));
  let mut searcher = Searcher::new();
  searcher.prepare(
    &Params::from_pairs([("m_camp", "9-rohwer"), ("page", "2")]),
    &camp_config(),
  );
  let results = searcher.execute(&store, 10, 10).await.unwrap();

  let seen = store.seen.lock().unwrap();
  assert_eq!(seen.len(), 1);
  assert_eq!(seen[0].indices, ["namesperson"]);
  assert_eq!(seen[0].body["from"], 10);

  assert_eq!(results.total, 25);
  assert_eq!(results.prev_offset, Some(0));
  assert_eq!(results.next_offset, Some(20));
  assert_eq!(results.this_page, 2);
  assert_eq!(results.hits.len(), 1);
  assert_eq!(results.params.first("page"), Some("2"));
  assert!(results.query.get("from").is_none());
}
