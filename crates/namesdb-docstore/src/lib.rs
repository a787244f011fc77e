//! HTTP clients behind the `namesdb-core` traits.
//!
//! - [`ElasticDocstore`] implements [`Docstore`](namesdb_core::docstore::Docstore)
//!   over the Elasticsearch REST API.
//! - [`DdrClient`] implements [`ObjectSource`](namesdb_core::objects::ObjectSource)
//!   over the digital repository's JSON API.
//!
//! Both are built once from configuration and shared; every request carries
//! the configured timeout.

mod ddr;
mod elastic;

pub mod config;
pub mod error;

pub use config::{DdrConfig, ElasticConfig};
pub use ddr::DdrClient;
pub use elastic::{ClusterHealth, ElasticDocstore};
pub use error::{Error, Result};
