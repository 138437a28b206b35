pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliArgs;

pub use adapters::{csv_sink::CsvSink, http::NeoWsClient, postgres::PostgresSink};
pub use config::EtlConfig;
pub use core::{etl::EtlEngine, pipeline::NeoPipeline};
pub use domain::model::{AsteroidRecord, AsteroidTable, FetchResult, LoadFailurePolicy};
pub use utils::error::{EtlError, Result};
