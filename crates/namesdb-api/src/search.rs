//! Handlers for `GET|POST /api/1.0/search`.
//!
//! Parameters come from the query string, or on POST from a JSON object
//! body as well. The query string wins where both name the same key.
//! Unknown keys are dropped without complaint.

use axum::{
  Json,
  body::Bytes,
  extract::{RawQuery, State},
};
use namesdb_core::{
  Model,
  docstore::Docstore,
  format::Formatter,
  objects::ObjectSource,
  params::{self, Params},
  query::{SearchConfig, Searcher},
  results::Envelope,
};
use serde_json::Value;

use crate::{AppState, ApiError, Origin, query_params};

/// `GET /api/1.0/search[?fulltext=...][&models=...][&<filter>=...][&page=...]`
pub async fn get_handler<D, O>(
  State(state): State<AppState<D, O>>,
  origin: Origin,
  RawQuery(raw): RawQuery,
) -> Result<Json<Envelope>, ApiError>
where
  D: Docstore,
  O: ObjectSource,
{
  let params = query_params(raw.as_deref());
  run(&state, &origin, &params).await.map(Json)
}

/// `POST /api/1.0/search` with an optional JSON object body.
pub async fn post_handler<D, O>(
  State(state): State<AppState<D, O>>,
  origin: Origin,
  RawQuery(raw): RawQuery,
  body: Bytes,
) -> Result<Json<Envelope>, ApiError>
where
  D: Docstore,
  O: ObjectSource,
{
  let mut params = query_params(raw.as_deref());
  if !body.iter().all(u8::is_ascii_whitespace) {
    let value: Value = serde_json::from_slice(&body)
      .map_err(|e| ApiError::BadRequest(format!("invalid JSON body: {e}")))?;
    if !value.is_object() {
      return Err(ApiError::BadRequest("body must be a JSON object".into()));
    }
    params.merge_json(&value);
  }
  run(&state, &origin, &params).await.map(Json)
}

/// Search every searchable model and assemble one page of results.
async fn run<D, O>(
  state: &AppState<D, O>,
  origin: &Origin,
  params: &Params,
) -> Result<Envelope, ApiError>
where
  D: Docstore,
  O: ObjectSource,
{
  let settings = &state.settings;
  let config = SearchConfig::for_models(&settings.index_prefix, &Model::SEARCHABLE);
  page(state, origin, params, &config).await
}

/// Prepare `params` against `config`, run one page and format it. Shared
/// by the search and listing endpoints.
pub(crate) async fn page<D, O>(
  state: &AppState<D, O>,
  origin: &Origin,
  params: &Params,
  config: &SearchConfig,
) -> Result<Envelope, ApiError>
where
  D: Docstore,
  O: ObjectSource,
{
  let settings = &state.settings;
  let paging = settings.paging(params);
  let mut searcher = Searcher::new();
  searcher.prepare(params, config);
  let results = searcher
    .execute(state.docstore.as_ref(), paging.limit, paging.offset)
    .await?;
  let formatter = Formatter::new(origin.routes.clone(), &settings.index_prefix);
  Ok(results.to_envelope(&origin.url, &formatter, params.flag(params::PAD))?)
}
