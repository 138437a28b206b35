// Adapters layer: concrete implementations for external systems (NeoWs API, PostgreSQL, local files).

pub mod csv_sink;
pub mod http;
pub mod postgres;
