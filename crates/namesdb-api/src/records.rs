//! Handlers for the record collections.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/api/1.0/{persons\|farrecords\|wrarecords}` | Filters from the query string |
//! | `GET`  | `/api/1.0/persons/{naan}/{noid}` | 404 if not found |
//! | `GET`  | `/api/1.0/{farrecords\|wrarecords}/{id}` | 404 if not found |

use axum::{
  Json,
  extract::{Path, RawQuery, State},
};
use namesdb_core::{
  Model, NrId,
  docstore::Docstore,
  format::Formatter,
  objects::ObjectSource,
  query::SearchConfig,
  results::Envelope,
};
use serde_json::Value;
use tracing::debug;

use crate::{AppState, ApiError, Origin, query_params, search};

/// Resolve a collection path segment, accepting only plural forms of the
/// listed models.
fn collection(segment: &str, allowed: &[Model]) -> Result<Model, ApiError> {
  let not_found = || ApiError::NotFound(format!("no such collection: {segment}"));
  let model = Model::from_path(segment).map_err(|_| not_found())?;
  let plural = format!("{model}s");
  if segment != plural || !allowed.contains(&model) {
    return Err(not_found());
  }
  Ok(model)
}

// ─── List ────────────────────────────────────────────────────────────────────

/// `GET /api/1.0/{collection}[?<filter>=...][&page=...]`
pub async fn list<D, O>(
  State(state): State<AppState<D, O>>,
  origin: Origin,
  Path(segment): Path<String>,
  RawQuery(raw): RawQuery,
) -> Result<Json<Envelope>, ApiError>
where
  D: Docstore,
  O: ObjectSource,
{
  let model = collection(&segment, &Model::SEARCHABLE)?;
  let params = query_params(raw.as_deref());
  let config = SearchConfig::listing(&state.settings.index_prefix, model);
  search::page(&state, &origin, &params, &config).await.map(Json)
}

// ─── Detail ──────────────────────────────────────────────────────────────────

/// `GET /api/1.0/persons/{naan}/{noid}`
pub async fn person<D, O>(
  State(state): State<AppState<D, O>>,
  origin: Origin,
  Path((naan, noid)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError>
where
  D: Docstore,
  O: ObjectSource,
{
  let nr_id = NrId::from_parts(&naan, &noid)
    .map_err(|_| ApiError::NotFound(format!("person {naan}/{noid} not found")))?;
  fetch(&state, &origin, Model::Person, &nr_id.to_string())
    .await
    .map(Json)
}

/// `GET /api/1.0/{farrecords|wrarecords}/{id}`
pub async fn detail<D, O>(
  State(state): State<AppState<D, O>>,
  origin: Origin,
  Path((segment, id)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError>
where
  D: Docstore,
  O: ObjectSource,
{
  let model = collection(&segment, &[Model::FarRecord, Model::WraRecord])?;
  fetch(&state, &origin, model, &id).await.map(Json)
}

/// Get one document and format it for display. Missing is 404.
pub(crate) async fn fetch<D, O>(
  state: &AppState<D, O>,
  origin: &Origin,
  model: Model,
  id: &str,
) -> Result<Value, ApiError>
where
  D: Docstore,
  O: ObjectSource,
{
  let index = model.index_name(&state.settings.index_prefix);
  debug!(%model, id, "fetching record");
  let hit = state
    .docstore
    .get(&index, id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("{model} {id} not found")))?;
  let formatter =
    Formatter::new(origin.routes.clone(), &state.settings.index_prefix);
  Ok(formatter.detail(model, &hit.source)?)
}
