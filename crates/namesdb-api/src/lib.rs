//! JSON REST API for the Names Registry.
//!
//! Exposes an axum [`Router`] backed by any [`Docstore`] for records and any
//! [`ObjectSource`] for linked archival objects. TLS, HTML pages and
//! transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = namesdb_api::api_router(state).layer(TraceLayer::new_for_http());
//! ```

pub mod error;
pub mod facets;
pub mod farpages;
pub mod index;
pub mod objects;
pub mod origin;
pub mod records;
pub mod search;

use std::sync::Arc;

use axum::{Router, routing::get};
use namesdb_core::{
  docstore::Docstore,
  objects::ObjectSource,
  pagination::Paging,
  params::{self, Params},
};

pub use error::ApiError;
pub use origin::Origin;

// ─── Settings ────────────────────────────────────────────────────────────────

/// Request-independent knobs shared by every handler.
#[derive(Debug, Clone)]
pub struct ApiSettings {
  /// Prepended to model names to form index names.
  pub index_prefix: String,
  /// Rows per page when a request names no `limit`.
  pub page_size:    u64,
  /// Largest `limit` a request may ask for.
  pub max_limit:    u64,
}

impl Default for ApiSettings {
  fn default() -> Self {
    Self { index_prefix: "names".into(), page_size: 25, max_limit: 1000 }
  }
}

impl ApiSettings {
  /// Resolve the paging params of a request.
  pub fn paging(&self, params: &Params) -> Paging {
    Paging::resolve(
      params.int(params::PAGE),
      params.int(params::LIMIT),
      params.int(params::OFFSET),
      self.page_size,
      self.max_limit,
    )
  }
}

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all handlers. Built once at startup.
pub struct AppState<D, O> {
  pub docstore: Arc<D>,
  pub objects:  Arc<O>,
  pub settings: Arc<ApiSettings>,
}

impl<D, O> AppState<D, O> {
  pub fn new(docstore: D, objects: O, settings: ApiSettings) -> Self {
    Self {
      docstore: Arc::new(docstore),
      objects:  Arc::new(objects),
      settings: Arc::new(settings),
    }
  }
}

impl<D, O> Clone for AppState<D, O> {
  fn clone(&self) -> Self {
    Self {
      docstore: Arc::clone(&self.docstore),
      objects:  Arc::clone(&self.objects),
      settings: Arc::clone(&self.settings),
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the API router, with every route under `/api/1.0/`.
///
/// The returned `Router<()>` can be merged into any parent router regardless
/// of its own state type.
pub fn api_router<D, O>(state: AppState<D, O>) -> Router<()>
where
  D: Docstore + 'static,
  O: ObjectSource + 'static,
{
  Router::new()
    .route("/api/1.0", get(index::handler))
    .route("/api/1.0/", get(index::handler))
    // Search
    .route(
      "/api/1.0/search",
      get(search::get_handler::<D, O>).post(search::post_handler::<D, O>),
    )
    .route("/api/1.0/facets/{model}", get(facets::handler::<D, O>))
    // Records
    .route("/api/1.0/farpages", get(farpages::list::<D, O>))
    .route(
      "/api/1.0/farpages/{facility_id}/{page}",
      get(farpages::detail::<D, O>),
    )
    .route("/api/1.0/persons/{naan}/{noid}", get(records::person::<D, O>))
    .route(
      "/api/1.0/persons/{naan}/{noid}/objects",
      get(objects::handler::<D, O>),
    )
    .route("/api/1.0/{collection}", get(records::list::<D, O>))
    .route("/api/1.0/{collection}/{id}", get(records::detail::<D, O>))
    .with_state(state)
}

/// Decode a raw query string into [`Params`].
pub(crate) fn query_params(raw: Option<&str>) -> Params {
  Params::from_pairs(
    url::form_urlencoded::parse(raw.unwrap_or_default().as_bytes()).into_owned(),
  )
}
