use crate::domain::model::{AsteroidTable, FetchResult, LoadFailurePolicy, LoadReport};
use crate::utils::error::Result;
use crate::utils::retry::RetryPolicy;
use async_trait::async_trait;
use std::time::Duration;

/// Append-only destination for transformed rows.
pub trait Sink: Send + Sync {
    /// Appends every row and returns how many were written.
    fn append(
        &self,
        table: &AsteroidTable,
    ) -> impl std::future::Future<Output = Result<u64>> + Send;

    fn describe(&self) -> String;
}

pub trait ConfigProvider: Send + Sync {
    fn api_endpoint(&self) -> &str;
    fn api_key(&self) -> &str;
    fn start_date(&self) -> &str;
    fn request_timeout(&self) -> Duration;
    fn retry_policy(&self) -> RetryPolicy;
    fn load_failure_policy(&self) -> LoadFailurePolicy;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<FetchResult>;
    async fn transform(&self, data: FetchResult) -> Result<AsteroidTable>;
    async fn load(&self, table: AsteroidTable) -> Result<LoadReport>;

    fn start_date(&self) -> &str;
}
