use crate::domain::model::{ApiFailure, FetchResult};
use crate::utils::error::{EtlError, Result};
use crate::utils::retry::{retry_with, RetryPolicy};
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// Client for the NeoWs `feed` endpoint.
#[derive(Debug, Clone)]
pub struct NeoWsClient {
    client: Client,
    endpoint: String,
    api_key: String,
    retry: RetryPolicy,
}

impl NeoWsClient {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        retry: RetryPolicy,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            retry,
        })
    }

    /// Fetch the feed window starting at `start_date` (`YYYY-MM-DD`).
    ///
    /// Transport failures are retried per the client's [`RetryPolicy`] and
    /// returned as errors once exhausted. A non-200 answer is a complete
    /// response: it comes back as [`FetchResult::ApiFailure`] without retrying.
    pub async fn fetch_feed(&self, start_date: &str) -> Result<FetchResult> {
        tracing::debug!(
            "Requesting NeoWs feed from {} for start_date={}",
            self.endpoint,
            start_date
        );

        let (status, body) = retry_with(
            &self.retry,
            "NeoWs feed request",
            EtlError::is_transient,
            || self.send_once(start_date),
        )
        .await?;

        if status != StatusCode::OK {
            let failure = ApiFailure {
                status: status.as_u16(),
            };
            tracing::error!(
                severity = "critical",
                status = failure.status,
                "The API response is not 200, the data are not retrieved"
            );
            return Ok(FetchResult::ApiFailure(failure));
        }

        let feed: serde_json::Value = serde_json::from_str(&body)?;
        tracing::info!(
            "Request was a success, {} bytes received for {}",
            body.len(),
            start_date
        );

        Ok(FetchResult::Feed(feed))
    }

    async fn send_once(&self, start_date: &str) -> Result<(StatusCode, String)> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("start_date", start_date), ("api_key", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("API response status: {}", status);

        let body = response.text().await?;
        Ok((status, body))
    }
}
