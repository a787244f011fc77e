//! The public origin of an inbound request, for building absolute links.
//!
//! Proxy headers win: `X-Forwarded-Proto` and `X-Forwarded-Host`, then
//! `Host`, then the request URI's authority, then `http://localhost`.

use axum::{
  extract::FromRequestParts,
  http::{HeaderName, header, request::Parts},
};
use namesdb_core::routes::Routes;
use url::Url;

use crate::error::ApiError;

const FORWARDED_PROTO: HeaderName = HeaderName::from_static("x-forwarded-proto");
const FORWARDED_HOST: HeaderName = HeaderName::from_static("x-forwarded-host");

/// Extractor yielding URL routes for the request's origin, plus the full
/// request URL as the client saw it.
#[derive(Debug, Clone)]
pub struct Origin {
  pub routes: Routes,
  pub url:    Url,
}

impl Origin {
  pub fn from_parts(parts: &Parts) -> Result<Self, ApiError> {
    let scheme = first_value(parts, &FORWARDED_PROTO).unwrap_or("http");
    let host = first_value(parts, &FORWARDED_HOST)
      .or_else(|| first_value(parts, &header::HOST))
      .or_else(|| parts.uri.authority().map(|a| a.as_str()))
      .unwrap_or("localhost");
    let routes = Routes::new(scheme, host)
      .map_err(|_| ApiError::BadRequest(format!("bad origin {scheme}://{host}")))?;
    let path = parts
      .uri
      .path_and_query()
      .map(|pq| pq.as_str())
      .unwrap_or("/");
    let url = routes
      .url_for(path)
      .map_err(|_| ApiError::BadRequest(format!("bad request path {path}")))?;
    Ok(Self { routes, url })
  }
}

/// First comma-separated value of a header, trimmed.
fn first_value<'a>(parts: &'a Parts, name: &HeaderName) -> Option<&'a str> {
  let value = parts.headers.get(name)?.to_str().ok()?;
  value
    .split(',')
    .next()
    .map(str::trim)
    .filter(|v| !v.is_empty())
}

impl<S: Send + Sync> FromRequestParts<S> for Origin {
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    _state: &S,
  ) -> Result<Self, Self::Rejection> {
    Self::from_parts(parts)
  }
}

#[cfg(test)]
mod tests {
  use axum::http::Request;

  use super::*;

  fn origin(builder: axum::http::request::Builder) -> Origin {
    let (parts, ()) = builder.body(()).unwrap().into_parts();
    Origin::from_parts(&parts).unwrap()
  }

  #[test]
  fn host_header_sets_origin() {
    let o = origin(
      Request::builder()
        .uri("/api/1.0/search?fulltext=sato")
        .header("host", "names.example.org"),
    );
    assert_eq!(o.routes.origin().as_str(), "http://names.example.org/");
    assert_eq!(
      o.url.as_str(),
      "http://names.example.org/api/1.0/search?fulltext=sato"
    );
  }

  #[test]
  fn forwarded_headers_win() {
    let o = origin(
      Request::builder()
        .uri("/api/1.0/")
        .header("host", "10.0.0.5:8000")
        .header("x-forwarded-proto", "https")
        .header("x-forwarded-host", "names.example.org, proxy.internal"),
    );
    assert_eq!(o.routes.origin().as_str(), "https://names.example.org/");
  }

  #[test]
  fn falls_back_to_localhost() {
    let o = origin(Request::builder().uri("/api/1.0/"));
    assert_eq!(o.url.as_str(), "http://localhost/api/1.0/");
  }

  #[test]
  fn rejects_a_host_with_a_path() {
    let (parts, ()) = Request::builder()
      .uri("/")
      .header("host", "evil.example/x")
      .body(())
      .unwrap()
      .into_parts();
    assert!(matches!(
      Origin::from_parts(&parts),
      Err(ApiError::BadRequest(_))
    ));
  }
}
