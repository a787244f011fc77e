//! Error types for `namesdb-core`.

use thiserror::Error;

use crate::model::Model;

#[derive(Debug, Error)]
pub enum Error {
  /// [`Searcher::execute`](crate::query::Searcher::execute) was called before
  /// [`Searcher::prepare`](crate::query::Searcher::prepare).
  #[error("unprepared query: call prepare() before execute()")]
  UnpreparedQuery,

  #[error("{model} document has no {field} identifier")]
  MissingIdentifier { model: Model, field: &'static str },

  #[error("invalid identifier: {0:?}")]
  InvalidIdentifier(String),

  #[error("invalid url: {0}")]
  InvalidUrl(#[from] url::ParseError),

  #[error("unknown model or index: {0:?}")]
  UnknownModel(String),

  #[error("invalid field catalog: {0}")]
  Catalog(String),

  /// The engine call failed. Never retried.
  #[error("docstore error: {0}")]
  Docstore(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
