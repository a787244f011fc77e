//! Error type for `namesdb-docstore`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Transport failure: refused connection, timeout, TLS.
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  /// The upstream answered with a non-success status.
  #[error("upstream returned {status}: {body}")]
  Status { status: u16, body: String },

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("invalid url: {0}")]
  Url(#[from] url::ParseError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
