//! Price-facts collection from archived category listings.
//!
//! Each category is processed in turn: its monthly snapshots are discovered,
//! then fetched and extracted by a bounded set of concurrent futures. Every
//! future owns its result; the coordinator merges them only after all of a
//! category's pages have completed.

use std::future::Future;
use std::time::Duration;

use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use thiserror::Error;
use tokio::task::{spawn_blocking, JoinError};
use tokio::time::sleep;
use tracing::{info, warn};

use crate::client::archive::ArchiveClient;
use crate::client::cdx::Snapshot;
use crate::client::{ClientError, ClientResult};
use crate::extract::{extract_page, BlockError, PageExtraction};
use crate::model::{Category, Observation, Source};
use crate::types::{ArchiveConfig, CollectionConfig};

/// Anything that can list and serve archived pages.
pub trait PageSource {
    fn monthly_snapshots(
        &self,
        url: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> impl Future<Output = ClientResult<Vec<Snapshot>>> + Send;

    fn fetch_page(&self, snapshot: &Snapshot) -> impl Future<Output = ClientResult<String>> + Send;
}

impl PageSource for ArchiveClient {
    async fn monthly_snapshots(
        &self,
        url: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> ClientResult<Vec<Snapshot>> {
        ArchiveClient::monthly_snapshots(self, url, from, to).await
    }

    async fn fetch_page(&self, snapshot: &Snapshot) -> ClientResult<String> {
        ArchiveClient::fetch_page(self, snapshot).await
    }
}

#[derive(Debug, Error)]
pub enum PageError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] ClientError),

    #[error("extraction failed: {0}")]
    Extract(#[from] BlockError),

    #[error("extraction task failed: {0}")]
    Join(#[from] JoinError),
}

/// Result of fetching and extracting one archived page.
#[derive(Debug)]
pub struct PageOutcome {
    pub category: Category,
    pub snapshot: Snapshot,
    pub result: Result<PageExtraction, PageError>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageFailure {
    pub category: Category,
    pub archive_url: String,
    pub error: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiscoveryFailure {
    pub category: Category,
    pub url: String,
    pub error: String,
}

/// Everything a collection run produced, including what it had to drop.
#[derive(Clone, Debug, Default)]
pub struct CollectionReport {
    pub observations: Vec<Observation>,
    pub snapshots_found: usize,
    pub pages_fetched: usize,
    pub page_failures: Vec<PageFailure>,
    pub discovery_failures: Vec<DiscoveryFailure>,
    pub blocks_not_a_product: usize,
    pub blocks_malformed: usize,
}

impl CollectionReport {
    fn absorb(&mut self, outcome: PageOutcome) {
        match outcome.result {
            Ok(page) => {
                self.pages_fetched += 1;
                self.blocks_not_a_product += page.not_a_product;
                self.blocks_malformed += page.malformed;
                self.observations.extend(page.observations);
            }
            Err(err) => {
                warn!(
                    target: "collector",
                    category = %outcome.category,
                    url = %outcome.snapshot.archive_url,
                    error = %err,
                    "archived page failed"
                );
                self.page_failures.push(PageFailure {
                    category: outcome.category,
                    archive_url: outcome.snapshot.archive_url,
                    error: err.to_string(),
                });
            }
        }
    }
}

async fn fetch_and_extract<S: PageSource>(
    source: &S,
    category: Category,
    snapshot: Snapshot,
) -> PageOutcome {
    let result = match source.fetch_page(&snapshot).await {
        Ok(html) => {
            let date = snapshot.date();
            // Parsing is CPU-bound; keep it off the task driving the other fetches.
            let parsed =
                spawn_blocking(move || extract_page(&html, category, date, Source::Historical))
                    .await;
            match parsed {
                Ok(extracted) => extracted.map_err(PageError::from),
                Err(err) => Err(PageError::from(err)),
            }
        }
        Err(err) => Err(PageError::from(err)),
    };
    PageOutcome {
        category,
        snapshot,
        result,
    }
}

/// Fetch and extract a category's snapshots with at most `workers` in flight.
pub async fn collect_category<S: PageSource>(
    source: &S,
    category: Category,
    snapshots: Vec<Snapshot>,
    workers: usize,
) -> Vec<PageOutcome> {
    stream::iter(snapshots)
        .map(|snapshot| fetch_and_extract(source, category, snapshot))
        .buffer_unordered(workers.max(1))
        .collect()
        .await
}

/// Collect observations for every configured category between the start date and `today`
/// (or the configured end date).
pub async fn collect_historical_data<S: PageSource>(
    source: &S,
    archive: &ArchiveConfig,
    collection: &CollectionConfig,
    today: NaiveDate,
) -> CollectionReport {
    let from = collection.start_date;
    let to = collection.end_date.unwrap_or(today);
    let delay = Duration::from_millis(collection.category_delay_ms);

    let mut report = CollectionReport::default();

    for (i, category) in collection.categories.iter().copied().enumerate() {
        if i > 0 && !delay.is_zero() {
            sleep(delay).await;
        }

        let url = archive.category_url(category);
        let snapshots = match source.monthly_snapshots(&url, from, to).await {
            Ok(snapshots) => snapshots,
            Err(err) => {
                warn!(target: "collector", category = %category, url = %url, error = %err, "snapshot discovery failed");
                report.discovery_failures.push(DiscoveryFailure {
                    category,
                    url,
                    error: err.to_string(),
                });
                continue;
            }
        };

        info!(
            target: "collector",
            category = %category,
            snapshots = snapshots.len(),
            "found snapshots"
        );
        report.snapshots_found += snapshots.len();

        let before = report.observations.len();
        for outcome in collect_category(source, category, snapshots, collection.workers).await {
            report.absorb(outcome);
        }
        info!(
            target: "collector",
            category = %category,
            observations = report.observations.len() - before,
            "category collected"
        );
    }

    report
        .observations
        .sort_by(|a, b| a.date.cmp(&b.date).then(a.category.cmp(&b.category)));
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(ts: &str) -> Snapshot {
        Snapshot::new("https://archive.test/web", ts, "https://shop.test/us/en-us/boots").unwrap()
    }

    #[test]
    fn test_absorb_counts_failures_and_blocks() {
        let mut report = CollectionReport::default();
        report.absorb(PageOutcome {
            category: Category::Boots,
            snapshot: snapshot("20200101000000"),
            result: Ok(PageExtraction {
                observations: Vec::new(),
                not_a_product: 2,
                malformed: 1,
            }),
        });
        report.absorb(PageOutcome {
            category: Category::Boots,
            snapshot: snapshot("20200201000000"),
            result: Err(PageError::Fetch(ClientError::Config("offline".into()))),
        });

        assert_eq!(report.pages_fetched, 1);
        assert_eq!(report.blocks_not_a_product, 2);
        assert_eq!(report.blocks_malformed, 1);
        assert_eq!(report.page_failures.len(), 1);
        assert!(report.page_failures[0].archive_url.contains("20200201000000"));
    }
}
