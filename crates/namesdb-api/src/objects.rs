//! Handler for `GET /api/1.0/persons/{naan}/{noid}/objects`.
//!
//! An upstream error status is passed through in the reply's `status`
//! field; only a transport failure fails the request.

use axum::{
  Json,
  extract::{Path, State},
};
use namesdb_core::{
  NrId,
  docstore::Docstore,
  objects::{LinkedObjects, ObjectSource},
};

use crate::{AppState, ApiError};

/// `GET /api/1.0/persons/{naan}/{noid}/objects`
pub async fn handler<D, O>(
  State(state): State<AppState<D, O>>,
  Path((naan, noid)): Path<(String, String)>,
) -> Result<Json<LinkedObjects>, ApiError>
where
  D: Docstore,
  O: ObjectSource,
{
  let nr_id = NrId::from_parts(&naan, &noid)
    .map_err(|_| ApiError::NotFound(format!("person {naan}/{noid} not found")))?;
  let linked = state
    .objects
    .person_objects(&nr_id)
    .await
    .map_err(|e| ApiError::Upstream(Box::new(e)))?;
  Ok(Json(linked))
}
