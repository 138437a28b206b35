pub mod etl;
pub mod pipeline;
pub mod transform;

pub use crate::domain::model::{AsteroidRecord, AsteroidTable, FetchResult, LoadReport, RunReport};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Sink};
pub use crate::utils::error::Result;
pub use crate::utils::retry::RetryPolicy;
