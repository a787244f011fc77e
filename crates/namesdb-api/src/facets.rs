//! Handler for `GET /api/1.0/facets/{model}`.
//!
//! Runs the query string's filters against one model with no hits requested
//! and labels the aggregation buckets that come back.

use axum::{
  Json,
  extract::{Path, RawQuery, State},
};
use namesdb_core::{
  Model,
  docstore::Docstore,
  facets::{Facet, facets},
  objects::ObjectSource,
  query::{SearchConfig, Searcher},
};
use serde::Serialize;

use crate::{AppState, ApiError, query_params};

#[derive(Debug, Serialize)]
pub struct FacetsResponse {
  pub model:  Model,
  /// Documents matching the filters.
  pub total:  u64,
  pub facets: Vec<Facet>,
}

/// `GET /api/1.0/facets/{model}[?<filter>=...]`
pub async fn handler<D, O>(
  State(state): State<AppState<D, O>>,
  Path(segment): Path<String>,
  RawQuery(raw): RawQuery,
) -> Result<Json<FacetsResponse>, ApiError>
where
  D: Docstore,
  O: ObjectSource,
{
  let model = Model::from_path(&segment)
    .map_err(|_| ApiError::NotFound(format!("no such model: {segment}")))?;
  let params = query_params(raw.as_deref());
  let config = SearchConfig::for_models(&state.settings.index_prefix, &[model]);
  let mut searcher = Searcher::new();
  searcher.prepare(&params, &config);
  let results = searcher.execute(state.docstore.as_ref(), 0, 0).await?;
  Ok(Json(FacetsResponse {
    model,
    total: results.total,
    facets: facets(model, &results.aggregations),
  }))
}
