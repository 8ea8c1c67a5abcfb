//! Snapshot discovery against the web archive CDX API.
//!
//! The CDX endpoint lists every capture of an exact URL between two dates.
//! Only the first capture of each calendar month is kept.

use std::collections::HashSet;

use chrono::{NaiveDate, NaiveDateTime};
use reqwest::Client;
use tracing::debug;

use super::{headers::HeaderRotation, ClientError, ClientResult};
use crate::utils::time::{cdx_date, parse_archive_timestamp, Period};

/// One archived capture of a page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    pub timestamp: NaiveDateTime,
    pub archive_url: String,
}

impl Snapshot {
    pub fn new(snapshot_base: &str, raw_timestamp: &str, original_url: &str) -> ClientResult<Self> {
        let timestamp = parse_archive_timestamp(raw_timestamp)
            .ok_or_else(|| ClientError::Timestamp(raw_timestamp.to_string()))?;
        Ok(Self {
            timestamp,
            archive_url: format!(
                "{}/{}/{}",
                snapshot_base.trim_end_matches('/'),
                raw_timestamp,
                original_url
            ),
        })
    }

    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    pub fn period(&self) -> Period {
        Period::from_date(self.date())
    }
}

/// Keep the first snapshot of every calendar month, in discovery order.
pub fn monthly_snapshots(snapshots: Vec<Snapshot>) -> Vec<Snapshot> {
    let mut seen = HashSet::new();
    snapshots
        .into_iter()
        .filter(|s| seen.insert(s.period()))
        .collect()
}

/// Turn a CDX `output=json` table (header row first) into snapshots.
pub fn parse_cdx_rows(rows: &[Vec<String>], snapshot_base: &str) -> ClientResult<Vec<Snapshot>> {
    let Some((header, body)) = rows.split_first() else {
        return Ok(Vec::new());
    };

    let column = |name: &str| {
        header
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| ClientError::Config(format!("CDX response lacks a {name:?} column")))
    };
    let ts_idx = column("timestamp")?;
    let original_idx = column("original")?;

    body.iter()
        .filter_map(|row| Some((row.get(ts_idx)?, row.get(original_idx)?)))
        .map(|(ts, original)| Snapshot::new(snapshot_base, ts, original))
        .collect()
}

/// Client for the CDX listing endpoint.
pub struct CdxClient {
    http: Client,
    cdx_url: String,
    snapshot_url: String,
    headers: HeaderRotation,
}

impl CdxClient {
    pub fn new(http: Client, cdx_url: &str, snapshot_url: &str, headers: HeaderRotation) -> Self {
        Self {
            http,
            cdx_url: cdx_url.to_string(),
            snapshot_url: snapshot_url.to_string(),
            headers,
        }
    }

    /// All captures of `url` between `from` and `to`, reduced to one per month.
    pub async fn monthly_snapshots(
        &self,
        url: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> ClientResult<Vec<Snapshot>> {
        let (from, to) = (cdx_date(from), cdx_date(to));
        let resp = self
            .http
            .get(&self.cdx_url)
            .headers(self.headers.headers())
            .query(&[
                ("url", url),
                ("matchType", "exact"),
                ("output", "json"),
                ("from", from.as_str()),
                ("to", to.as_str()),
            ])
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::status(status, &body));
        }

        let body = resp.text().await?;
        if body.trim().is_empty() {
            return Ok(Vec::new());
        }
        let rows: Vec<Vec<String>> = serde_json::from_str(&body)?;
        let all = parse_cdx_rows(&rows, &self.snapshot_url)?;
        debug!(target: "collector", url = %url, captures = all.len(), "cdx listing received");

        Ok(monthly_snapshots(all))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://web.archive.org/web";

    fn rows(entries: &[(&str, &str)]) -> Vec<Vec<String>> {
        let mut out = vec![vec![
            "urlkey".to_string(),
            "timestamp".to_string(),
            "original".to_string(),
            "mimetype".to_string(),
            "statuscode".to_string(),
        ]];
        for (ts, url) in entries {
            out.push(vec![
                "com,example)/sandals".to_string(),
                ts.to_string(),
                url.to_string(),
                "text/html".to_string(),
                "200".to_string(),
            ]);
        }
        out
    }

    #[test]
    fn test_parse_rows_builds_archive_url() {
        let table = rows(&[("20200105120000", "https://example.com/sandals")]);
        let snaps = parse_cdx_rows(&table, BASE).unwrap();
        assert_eq!(snaps.len(), 1);
        assert_eq!(
            snaps[0].archive_url,
            "https://web.archive.org/web/20200105120000/https://example.com/sandals"
        );
        assert_eq!(snaps[0].period().to_string(), "2020-01");
    }

    #[test]
    fn test_empty_table() {
        assert!(parse_cdx_rows(&[], BASE).unwrap().is_empty());
    }

    #[test]
    fn test_bad_timestamp_is_error() {
        let table = rows(&[("2020-01-05", "https://example.com/sandals")]);
        assert!(matches!(
            parse_cdx_rows(&table, BASE),
            Err(ClientError::Timestamp(_))
        ));
    }

    #[test]
    fn test_first_snapshot_per_month_wins() {
        let table = rows(&[
            ("20200120000000", "u"),
            ("20200105000000", "u"),
            ("20200201000000", "u"),
            ("20210101000000", "u"),
        ]);
        let snaps = monthly_snapshots(parse_cdx_rows(&table, BASE).unwrap());
        let stamps: Vec<String> = snaps
            .iter()
            .map(|s| s.timestamp.format("%Y%m%d").to_string())
            .collect();
        assert_eq!(stamps, vec!["20200120", "20200201", "20210101"]);
    }
}
