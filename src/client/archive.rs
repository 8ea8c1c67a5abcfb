use std::time::Duration;

use chrono::NaiveDate;
use reqwest::Client;
use tokio::time::sleep;
use tracing::debug;

use crate::types::ArchiveConfig;

use super::cdx::{CdxClient, Snapshot};
use super::headers::HeaderRotation;
use super::{ClientError, ClientResult};

/// Fetches archived listing pages, rotating headers and retrying transient failures.
pub struct ArchiveClient {
    http: Client,
    headers: HeaderRotation,
    cdx: CdxClient,
    max_retries: u32,
}

impl ArchiveClient {
    pub fn new(config: &ArchiveConfig) -> ClientResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(ClientError::Http)?;
        let headers = HeaderRotation::new(config.user_agents.clone())?;
        let cdx = CdxClient::new(
            http.clone(),
            &config.cdx_url,
            &config.snapshot_url,
            headers.clone(),
        );

        Ok(Self {
            http,
            headers,
            cdx,
            max_retries: config.max_retries,
        })
    }

    fn backoff(attempt: u32) -> Duration {
        let capped = attempt.min(5);
        let millis = 500 * (1_u64 << capped);
        Duration::from_millis(millis.min(8_000))
    }

    pub async fn monthly_snapshots(
        &self,
        url: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> ClientResult<Vec<Snapshot>> {
        self.cdx.monthly_snapshots(url, from, to).await
    }

    /// Download the raw markup of one archived capture.
    pub async fn fetch_page(&self, snapshot: &Snapshot) -> ClientResult<String> {
        let mut attempt = 0;
        loop {
            let req = self
                .http
                .get(&snapshot.archive_url)
                .headers(self.headers.headers());

            match req.send().await {
                Ok(resp) => {
                    if resp.status().is_success() {
                        return Ok(resp.text().await?);
                    }

                    if resp.status().is_server_error() && attempt < self.max_retries {
                        attempt += 1;
                        debug!(
                            target: "collector",
                            url = %snapshot.archive_url,
                            status = %resp.status(),
                            attempt,
                            "retrying archived page"
                        );
                        sleep(Self::backoff(attempt)).await;
                        continue;
                    }

                    let status = resp.status();
                    let body = resp.text().await.unwrap_or_default();
                    return Err(ClientError::status(status, &body));
                }
                Err(err) => {
                    let transient = err.is_timeout() || err.is_connect() || err.is_request();
                    if transient && attempt < self.max_retries {
                        attempt += 1;
                        debug!(
                            target: "collector",
                            url = %snapshot.archive_url,
                            error = %err,
                            attempt,
                            "retrying archived page"
                        );
                        sleep(Self::backoff(attempt)).await;
                        continue;
                    }

                    return Err(ClientError::Http(err));
                }
            }
        }
    }
}
