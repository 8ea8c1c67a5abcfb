use serde::Serialize;
use tracing::info;

use crate::analysis::AspAnalysis;
use crate::collector::CollectionReport;
use crate::types::AppConfig;

#[derive(Serialize)]
struct StartupLog<'a> {
    event: &'a str,
    categories: Vec<&'a str>,
    start_date: String,
    end_date: Option<String>,
    workers: usize,
}

pub fn log_startup(cfg: &AppConfig) {
    let payload = StartupLog {
        event: "startup",
        categories: cfg.collection.categories.iter().map(|c| c.slug()).collect(),
        start_date: cfg.collection.start_date.to_string(),
        end_date: cfg.collection.end_date.map(|d| d.to_string()),
        workers: cfg.collection.workers,
    };
    info!(target: "asp", startup = serde_json::to_string(&payload).unwrap_or_default().as_str());
}

#[derive(Serialize)]
struct CollectionSummary<'a> {
    event: &'a str,
    observations: usize,
    snapshots_found: usize,
    pages_fetched: usize,
    pages_failed: usize,
    discovery_failures: usize,
    blocks_not_a_product: usize,
    blocks_malformed: usize,
}

pub fn log_collection_summary(report: &CollectionReport) {
    let summary = CollectionSummary {
        event: "collection_summary",
        observations: report.observations.len(),
        snapshots_found: report.snapshots_found,
        pages_fetched: report.pages_fetched,
        pages_failed: report.page_failures.len(),
        discovery_failures: report.discovery_failures.len(),
        blocks_not_a_product: report.blocks_not_a_product,
        blocks_malformed: report.blocks_malformed,
    };

    let payload = serde_json::to_string(&summary)
        .unwrap_or_else(|_| "{\"event\":\"collection_summary_error\"}".to_string());
    info!(target: "collector", "{payload}");
}

#[derive(Serialize)]
struct AnalysisSummary<'a> {
    event: &'a str,
    periods: usize,
    first_period: Option<String>,
    last_period: Option<String>,
    category_values: usize,
}

pub fn log_analysis_summary(analysis: &AspAnalysis) {
    let monthly = &analysis.overall_asp_trends.monthly_asp;
    let summary = AnalysisSummary {
        event: "analysis_summary",
        periods: monthly.len(),
        first_period: monthly.keys().next().map(|p| p.to_string()),
        last_period: monthly.keys().next_back().map(|p| p.to_string()),
        category_values: analysis
            .product_mix_impact
            .category_mix
            .asp_by_dimension
            .values()
            .flat_map(|row| row.keys())
            .collect::<std::collections::BTreeSet<_>>()
            .len(),
    };

    let payload = serde_json::to_string(&summary)
        .unwrap_or_else(|_| "{\"event\":\"analysis_summary_error\"}".to_string());
    info!(target: "analysis", "{payload}");
}
