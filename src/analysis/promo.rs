use std::collections::BTreeMap;

use serde::Serialize;

use super::group_by_period;
use crate::model::Observation;
use crate::utils::math::{mean, median, round2};
use crate::utils::time::Period;

/// Depth and total value of markdowns in one period, rounded to cents.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PromoSummary {
    pub discount_percentage_mean: f64,
    pub discount_percentage_median: f64,
    pub discount_amount_sum: f64,
}

pub fn analyze_promotional_impact(observations: &[Observation]) -> BTreeMap<Period, PromoSummary> {
    group_by_period(observations)
        .into_iter()
        .map(|(period, rows)| {
            let pct: Vec<f64> = rows.iter().map(|o| o.discount_percentage).collect();
            let summary = PromoSummary {
                discount_percentage_mean: mean(&pct).map(round2).unwrap_or_default(),
                discount_percentage_median: median(&pct).map(round2).unwrap_or_default(),
                discount_amount_sum: round2(rows.iter().map(|o| o.discount_amount).sum()),
            };
            (period, summary)
        })
        .collect()
}
