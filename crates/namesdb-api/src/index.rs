//! Handler for `GET /api/1.0/`: absolute links to every collection.

use axum::Json;
use serde_json::{Value, json};

use crate::Origin;

/// `GET /api/1.0/`
pub async fn handler(origin: Origin) -> Json<Value> {
  let routes = &origin.routes;
  Json(json!({
    "persons": routes.api("persons"),
    "farrecords": routes.api("farrecords"),
    "wrarecords": routes.api("wrarecords"),
    "farpages": routes.api("farpages"),
    "search": routes.api("search"),
  }))
}
