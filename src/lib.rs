pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::cli::CliConfig;
pub use crate::config::DbConfig;

pub use crate::adapters::local::DataDir;
pub use crate::adapters::postgres::{PgDestination, PgWarehouse};
pub use crate::app::pipelines::ingest_pipeline::IngestPipeline;
pub use crate::core::cache::FetchCache;
pub use crate::core::etl::EtlEngine;
pub use crate::utils::error::{EtlError, Result};
