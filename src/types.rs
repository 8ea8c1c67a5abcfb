use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::Category;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    /// Storefront root whose category listings are looked up in the archive.
    pub site_base_url: String,
    pub locale_path: String,
    pub cdx_url: String,
    pub snapshot_url: String,
    pub user_agents: Vec<String>,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            site_base_url: "https://www.birkenstock.com".to_string(),
            locale_path: "us/en-us".to_string(),
            cdx_url: "https://web.archive.org/cdx/search/cdx".to_string(),
            snapshot_url: "https://web.archive.org/web".to_string(),
            user_agents: vec![
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".to_string(),
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/14.0 Safari/605.1.15".to_string(),
            ],
            request_timeout_secs: 15,
            max_retries: 2,
        }
    }
}

impl ArchiveConfig {
    /// Live storefront URL of a category listing.
    pub fn category_url(&self, category: Category) -> String {
        format!(
            "{}/{}/{}",
            self.site_base_url.trim_end_matches('/'),
            self.locale_path.trim_matches('/'),
            category.slug()
        )
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionConfig {
    pub categories: Vec<Category>,
    pub start_date: NaiveDate,
    /// Defaults to the current date when unset.
    pub end_date: Option<NaiveDate>,
    /// Concurrent page fetches per category.
    pub workers: usize,
    /// Pause between categories, in milliseconds.
    pub category_delay_ms: u64,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            categories: Category::ALL.to_vec(),
            start_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or_default(),
            end_date: None,
            workers: 5,
            category_delay_ms: 2_000,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub observations_csv: PathBuf,
    pub analysis_json: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            observations_csv: PathBuf::from("birkenstock_historical_data.csv"),
            analysis_json: PathBuf::from("birkenstock_asp_analysis.json"),
        }
    }
}

impl OutputConfig {
    /// Re-root both output files under `dir`, keeping their file names.
    pub fn relocate(&mut self, dir: &Path) {
        for path in [&mut self.observations_csv, &mut self.analysis_json] {
            if let Some(name) = path.file_name() {
                *path = dir.join(name);
            }
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub archive: ArchiveConfig,
    pub collection: CollectionConfig,
    pub output: OutputConfig,
}

impl AppConfig {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file at {path}"))?;
        let cfg: Self = toml::from_str(&contents)
            .with_context(|| format!("failed to deserialize TOML config at {path}"))?;
        Ok(cfg)
    }

    /// Reject configurations that cannot produce a meaningful run.
    ///
    /// Called before any network activity.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.collection.categories.is_empty() {
            bail!("no categories configured: set collection.categories to at least one of sandals, clogs, boots, shoes");
        }
        if self.archive.user_agents.is_empty() {
            bail!("archive.user_agents must contain at least one user agent string");
        }
        if self.collection.workers == 0 {
            bail!("collection.workers must be at least 1");
        }
        if let Some(end) = self.collection.end_date {
            if end < self.collection.start_date {
                bail!(
                    "collection.end_date {end} is before collection.start_date {}",
                    self.collection.start_date
                );
            }
        }
        Ok(())
    }
}
