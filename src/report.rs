//! Durable outputs of a run: the observation table as CSV and the analysis
//! document as JSON.

use std::fs;
use std::path::Path;

use anyhow::Context;
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;

use crate::analysis::AspAnalysis;
use crate::model::{Category, Channel, Observation, Pricing, Source};

fn ensure_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
    }
    Ok(())
}

/// Serialize observations to CSV, one row per record, header first.
pub fn observations_to_csv(observations: &[Observation]) -> anyhow::Result<String> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(Vec::new());
    for obs in observations {
        wtr.serialize(obs)?;
    }
    let bytes = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(bytes).context("CSV not UTF-8")
}

pub fn write_observations_csv(path: &Path, observations: &[Observation]) -> anyhow::Result<()> {
    ensure_parent(path)?;
    let contents = observations_to_csv(observations)?;
    fs::write(path, contents)
        .with_context(|| format!("failed to write observations to {}", path.display()))?;
    info!(
        target: "report",
        path = %path.display(),
        rows = observations.len(),
        "observations written"
    );
    Ok(())
}

/// Recorded columns of an observations CSV row.
///
/// Style, period and discount columns are derived, so they are ignored on
/// read and recomputed from these fields.
#[derive(Debug, Deserialize)]
struct ObservationRow {
    name: String,
    sku: Option<String>,
    category: Category,
    channel: Channel,
    current_price: f64,
    original_price: f64,
    is_new_product: bool,
    date: NaiveDate,
    source: Source,
}

impl From<ObservationRow> for Observation {
    fn from(row: ObservationRow) -> Self {
        Observation::new(
            row.name,
            row.sku,
            row.category,
            row.channel,
            Pricing::new(row.current_price, Some(row.original_price)),
            row.is_new_product,
            row.date,
            row.source,
        )
    }
}

pub fn observations_from_csv(contents: &str) -> anyhow::Result<Vec<Observation>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(contents.as_bytes());
    rdr.deserialize::<ObservationRow>()
        .enumerate()
        .map(|(i, row)| {
            row.map(Observation::from)
                .with_context(|| format!("invalid observation on data row {}", i + 1))
        })
        .collect()
}

pub fn read_observations_csv(path: &Path) -> anyhow::Result<Vec<Observation>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read observations from {}", path.display()))?;
    observations_from_csv(&contents)
}

pub fn analysis_to_json(analysis: &AspAnalysis) -> anyhow::Result<String> {
    serde_json::to_string_pretty(analysis).context("failed to serialize analysis")
}

pub fn write_analysis_json(path: &Path, analysis: &AspAnalysis) -> anyhow::Result<()> {
    ensure_parent(path)?;
    fs::write(path, analysis_to_json(analysis)?)
        .with_context(|| format!("failed to write analysis to {}", path.display()))?;
    info!(target: "report", path = %path.display(), "analysis written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;
    use crate::analysis::analyze_asp_trends;
    use crate::model::Style;

    fn sample() -> Vec<Observation> {
        vec![
            Observation::new(
                "Arizona, Suede".into(),
                Some("0951301".into()),
                Category::Sandals,
                Channel::Dtc,
                Pricing::new(110.0, Some(135.0)),
                true,
                NaiveDate::from_ymd_opt(2020, 1, 15).unwrap(),
                Source::Historical,
            ),
            Observation::new(
                "Boston".into(),
                None,
                Category::Clogs,
                Channel::Wholesale,
                Pricing::new(150.0, None),
                false,
                NaiveDate::from_ymd_opt(2020, 2, 3).unwrap(),
                Source::Historical,
            ),
        ]
    }

    #[test]
    fn test_csv_header_and_rows() {
        let csv = observations_to_csv(&sample()).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "name,sku,category,style,channel,current_price,original_price,discount_amount,\
             discount_percentage,is_new_product,date,period,source"
        );
        let first = lines.next().unwrap();
        assert!(first.starts_with("\"Arizona, Suede\",0951301,sandals,open,dtc,110.0,135.0,25.0,18.52,true,2020-01-15,2020-01,historical"));
        let second = lines.next().unwrap();
        assert!(second.contains(",,clogs,closed-toe,wholesale,"));
    }

    #[test]
    fn test_csv_reads_back() {
        let rows = sample();
        let csv = observations_to_csv(&rows).unwrap();
        assert_eq!(observations_from_csv(&csv).unwrap(), rows);
    }

    #[test]
    fn test_csv_rejects_unknown_category() {
        let csv = observations_to_csv(&sample()).unwrap().replace("clogs", "hats");
        assert!(observations_from_csv(&csv).is_err());
    }

    #[test]
    fn test_json_document_shape() {
        let json = analysis_to_json(&analyze_asp_trends(&sample())).unwrap();
        let doc: Value = serde_json::from_str(&json).unwrap();
        for key in [
            "overall_asp_trends",
            "product_mix_impact",
            "channel_mix_impact",
            "style_mix_impact",
            "pricing_actions",
            "promotional_impact",
        ] {
            assert!(doc.get(key).is_some(), "missing {key}");
        }
        assert_eq!(
            doc["overall_asp_trends"]["yoy_growth"]["2020-02"]["current_price_mean"],
            Value::String("NaN".into())
        );
        assert_eq!(
            doc["product_mix_impact"]["category_mix"]["mix_percentages"]["2020-01"]["sandals"],
            Value::from(1.0)
        );
        assert_eq!(doc["style_mix_impact"]["mix_impact"]["2020-01"], Value::from(0.0));
    }

    #[test]
    fn test_csv_derived_columns_are_recomputed() {
        let csv = "name,sku,category,style,channel,current_price,original_price,discount_amount,\
                   discount_percentage,is_new_product,date,period,source\n\
                   Arizona,,sandals,closed-toe,dtc,10.0,5.0,7.0,0.0,false,2020-01-15,2024-07,historical\n\
                   Boston,,clogs,open,dtc,75.0,100.0,0.0,0.0,false,2020-02-01,2020-01,historical\n";
        let rows = observations_from_csv(csv).unwrap();

        let arizona = &rows[0];
        assert_eq!(arizona.style, Style::Open);
        assert_eq!(arizona.style, arizona.category.style());
        assert_eq!(arizona.period.to_string(), "2020-01");
        assert_eq!(arizona.original_price, 10.0);
        assert_eq!(arizona.discount_amount, 0.0);
        assert_eq!(arizona.discount_percentage, 0.0);

        let boston = &rows[1];
        assert_eq!(boston.style, Style::ClosedToe);
        assert_eq!(boston.period.to_string(), "2020-02");
        assert_eq!(boston.discount_amount, 25.0);
        assert_eq!(boston.discount_percentage, 25.0);
    }

    #[test]
    fn test_files_written_under_new_directory() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("nested/obs.csv");
        let json_path = dir.path().join("nested/analysis.json");
        let rows = sample();

        write_observations_csv(&csv_path, &rows).unwrap();
        write_analysis_json(&json_path, &analyze_asp_trends(&rows)).unwrap();

        assert_eq!(read_observations_csv(&csv_path).unwrap(), rows);
        assert!(json_path.exists());
    }
}
