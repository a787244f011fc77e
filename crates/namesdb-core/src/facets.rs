//! Facet labelling and distinct-value lookups.

use serde::Serialize;
use serde_json::json;
use tracing::debug;

use crate::{
  Error, Model, Result,
  catalog::catalog,
  docstore::{Docstore, SearchRequest},
  query::AGG_SIZE,
  results::{Aggregations, unwrap_aggregations},
};

const VALUES_AGG: &str = "bucket";

/// One facet: a field, its label, and the values seen with their counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Facet {
  pub field:   String,
  pub label:   String,
  pub choices: Vec<FacetChoice>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacetChoice {
  pub key:       String,
  /// `"{pretty value} ({count})"`
  pub label:     String,
  pub doc_count: u64,
}

/// Label the aggregations of `model` in catalog order. Fields the engine
/// returned no aggregation for are left out.
pub fn facets(model: Model, aggregations: &Aggregations) -> Vec<Facet> {
  let cat = catalog(model);
  cat
    .agg_fields
    .iter()
    .filter_map(|&field| {
      let buckets = aggregations.get(field)?;
      let choices = buckets
        .iter()
        .map(|b| {
          let key = b.key_str();
          let pretty = cat.choice_label(field, &key).unwrap_or(key.as_str());
          FacetChoice {
            label: format!("{pretty} ({})", b.doc_count),
            key,
            doc_count: b.doc_count,
          }
        })
        .collect();
      Some(Facet { field: field.to_owned(), label: cat.label(field), choices })
    })
    .collect()
}

/// A hit-less request for the distinct values of `field`.
pub fn field_values_request(
  index_prefix: &str,
  model: Model,
  field: &str,
) -> SearchRequest {
  SearchRequest {
    indices: vec![model.index_name(index_prefix)],
    body:    json!({
      "size": 0,
      "aggs": { VALUES_AGG: { "terms": { "field": field, "size": AGG_SIZE } } },
    }),
  }
}

/// Distinct values of `field` in the `model` index, with document counts,
/// most frequent first.
pub async fn field_values<D: Docstore>(
  store: &D,
  index_prefix: &str,
  model: Model,
  field: &str,
) -> Result<Vec<(String, u64)>> {
  let request = field_values_request(index_prefix, model, field);
  debug!(%model, field, "fetching field values");
  let response = store
    .search(&request)
    .await
    .map_err(|e| Error::Docstore(Box::new(e)))?;
  let mut aggs = unwrap_aggregations(response.aggregations.as_ref());
  Ok(
    aggs
      .remove(VALUES_AGG)
      .unwrap_or_default()
      .into_iter()
      .map(|b| (b.key_str(), b.doc_count))
      .collect(),
  )
}
