use std::path::Path;

use chrono::Local;
use tracing::info;

use crate::{
    analysis::{analyze_asp_trends, AspAnalysis},
    client::archive::ArchiveClient,
    collector::{collect_historical_data, CollectionReport, PageSource},
    monitoring::logger::{log_analysis_summary, log_collection_summary},
    report::{read_observations_csv, write_analysis_json, write_observations_csv},
    types::AppConfig,
};

/// Collect from the archive, analyze, and write both output files.
pub async fn run_pipeline(cfg: &AppConfig) -> anyhow::Result<(CollectionReport, AspAnalysis)> {
    let client = ArchiveClient::new(&cfg.archive)?;
    run_with_source(cfg, &client, Local::now().date_naive()).await
}

/// Same as [`run_pipeline`] against any page source, with an explicit "today".
///
/// Configuration is validated before the source is touched.
pub async fn run_with_source<S: PageSource>(
    cfg: &AppConfig,
    source: &S,
    today: chrono::NaiveDate,
) -> anyhow::Result<(CollectionReport, AspAnalysis)> {
    cfg.validate()?;

    info!(target: "asp", "collecting historical data");
    let report = collect_historical_data(source, &cfg.archive, &cfg.collection, today).await;
    log_collection_summary(&report);

    info!(target: "asp", "analyzing ASP trends");
    let analysis = analyze_asp_trends(&report.observations);
    log_analysis_summary(&analysis);

    write_observations_csv(&cfg.output.observations_csv, &report.observations)?;
    write_analysis_json(&cfg.output.analysis_json, &analysis)?;

    Ok((report, analysis))
}

/// Recompute the analysis document from a previously written observations CSV.
pub fn analyze_file(cfg: &AppConfig, input: &Path) -> anyhow::Result<AspAnalysis> {
    let observations = read_observations_csv(input)?;
    info!(target: "asp", input = %input.display(), rows = observations.len(), "observations loaded");

    let analysis = analyze_asp_trends(&observations);
    log_analysis_summary(&analysis);
    write_analysis_json(&cfg.output.analysis_json, &analysis)?;
    Ok(analysis)
}
