//! Handlers for the FAR ledger pages.
//!
//! `GET /api/1.0/farpages` lists the facilities with scanned pages;
//! `GET /api/1.0/farpages/{facility_id}/{page}` is one page together with
//! the FAR records transcribed from it.

use axum::{
  Json,
  extract::{Path, State},
};
use namesdb_core::{
  Model,
  catalog::catalog,
  docstore::{Docstore, Hit},
  facets::field_values,
  format::Formatter,
  objects::ObjectSource,
  params::Params,
  query::{SearchConfig, Searcher, SortSpec},
  routes::far_page_id,
};
use serde::Serialize;
use serde_json::{Value, json};

use crate::{AppState, ApiError, Origin, records};

const FACILITY_FIELD: &str = "facility_id";
/// Position of a FAR record on its ledger page.
const LINE_FIELD: &str = "far_line_id";

// ─── Facilities ──────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct Facility {
  pub id:    String,
  /// Camp name, or the id when the catalog has none.
  pub label: String,
  pub pages: u64,
}

/// `GET /api/1.0/farpages`
pub async fn list<D, O>(
  State(state): State<AppState<D, O>>,
) -> Result<Json<Vec<Facility>>, ApiError>
where
  D: Docstore,
  O: ObjectSource,
{
  let cat = catalog(Model::FarPage);
  let values = field_values(
    state.docstore.as_ref(),
    &state.settings.index_prefix,
    Model::FarPage,
    FACILITY_FIELD,
  )
  .await?;
  let facilities = values
    .into_iter()
    .map(|(id, pages)| {
      let label = cat.choice_label(FACILITY_FIELD, &id).unwrap_or(id.as_str());
      Facility { label: label.to_owned(), id, pages }
    })
    .collect();
  Ok(Json(facilities))
}

// ─── One page ────────────────────────────────────────────────────────────────

/// `GET /api/1.0/farpages/{facility_id}/{page}`
pub async fn detail<D, O>(
  State(state): State<AppState<D, O>>,
  origin: Origin,
  Path((facility_id, page)): Path<(String, u32)>,
) -> Result<Json<Value>, ApiError>
where
  D: Docstore,
  O: ObjectSource,
{
  let id = far_page_id(&facility_id, page);
  let mut detail = records::fetch(&state, &origin, Model::FarPage, &id).await?;

  let settings = &state.settings;
  let params = Params::from_pairs([
    ("facility", facility_id.clone()),
    ("far_page", page.to_string()),
  ]);
  let config = SearchConfig {
    default_sort: vec![SortSpec::asc(LINE_FIELD)],
    ..SearchConfig::listing(&settings.index_prefix, Model::FarRecord)
  };
  let mut searcher = Searcher::new();
  searcher.prepare(&params, &config);
  let mut hits: Vec<Hit> = Vec::new();
  loop {
    let offset = hits.len() as u64;
    let results = searcher
      .execute(state.docstore.as_ref(), settings.max_limit, offset)
      .await?;
    let fetched = results.hits.len();
    hits.extend(results.hits);
    if fetched == 0 || hits.len() as u64 >= results.total {
      break;
    }
  }
  // Line ids are keywords; the engine sorts them as text.
  hits.sort_by_cached_key(ledger_line);

  let formatter = Formatter::new(origin.routes.clone(), &settings.index_prefix);
  let mut far_records = Vec::with_capacity(hits.len());
  for hit in &hits {
    if let Some(item) = formatter.list_item(hit)? {
      far_records.push(item);
    }
  }
  if let Value::Object(map) = &mut detail {
    map.insert("far_records".into(), json!(far_records));
  }
  Ok(Json(detail))
}

/// Sort key putting numeric line ids in numeric order, others after them.
fn ledger_line(hit: &Hit) -> (u64, String) {
  let line = match hit.source.get(LINE_FIELD) {
    Some(Value::String(s)) => s.clone(),
    Some(Value::Number(n)) => n.to_string(),
    _ => String::new(),
  };
  (line.trim().parse().unwrap_or(u64::MAX), line)
}
