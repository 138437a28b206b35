use crate::adapters::http::NeoWsClient;
use crate::core::transform::transform_feed;
use crate::core::{ConfigProvider, Pipeline, Sink};
use crate::domain::model::{AsteroidTable, FetchResult, LoadFailurePolicy, LoadReport};
use crate::utils::error::Result;

/// NeoWs feed → `AsteroidTable` → sink.
pub struct NeoPipeline<S: Sink, C: ConfigProvider> {
    pub(crate) sink: S,
    pub(crate) config: C,
    pub(crate) client: NeoWsClient,
}

impl<S: Sink, C: ConfigProvider> NeoPipeline<S, C> {
    pub fn new(sink: S, config: C) -> Result<Self> {
        let client = NeoWsClient::new(
            config.api_endpoint(),
            config.api_key(),
            config.retry_policy(),
            config.request_timeout(),
        )?;

        Ok(Self {
            sink,
            config,
            client,
        })
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}

#[async_trait::async_trait]
impl<S: Sink, C: ConfigProvider> Pipeline for NeoPipeline<S, C> {
    async fn extract(&self) -> Result<FetchResult> {
        // 非 200 回應以資料形式傳回，由 transform 判斷是否可用
        self.client.fetch_feed(self.config.start_date()).await
    }

    async fn transform(&self, data: FetchResult) -> Result<AsteroidTable> {
        transform_feed(&data)
    }

    async fn load(&self, table: AsteroidTable) -> Result<LoadReport> {
        tracing::debug!("Appending {} rows to {}", table.len(), self.sink.describe());

        match self.sink.append(&table).await {
            Ok(written) => {
                tracing::info!("Data successfully loaded ({} rows)", written);
                Ok(LoadReport::written(written))
            }
            Err(e) => match self.config.load_failure_policy() {
                LoadFailurePolicy::Swallow => {
                    tracing::error!(
                        severity = "critical",
                        sink = %self.sink.describe(),
                        "There is an error in the loading process: {}",
                        e
                    );
                    Ok(LoadReport::swallowed(e.rows_written(), e.to_string()))
                }
                LoadFailurePolicy::Fail => Err(e),
            },
        }
    }

    fn start_date(&self) -> &str {
        self.config.start_date()
    }
}
