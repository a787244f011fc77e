//! Core types and search logic for the Names Registry.
//!
//! This crate is deliberately free of HTTP dependencies. It knows how to turn
//! request parameters into an engine query, how to page through results and
//! how to shape engine hits into the public JSON form. Talking to the engine
//! is the job of a [`Docstore`](docstore::Docstore) implementation.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod catalog;
pub mod docstore;
pub mod error;
pub mod facets;
pub mod format;
pub mod model;
pub mod objects;
pub mod pagination;
pub mod params;
pub mod query;
pub mod record;
pub mod results;
pub mod routes;

pub use error::{Error, Result};
pub use model::{Model, NrId};
