use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::Figure;
use crate::model::Observation;
use crate::utils::math::{mean, median, pct_change, sample_std};
use crate::utils::time::Period;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChangeDistribution {
    pub mean: Figure,
    pub median: Figure,
    pub std: Figure,
}

/// Like-for-like price moves of individual SKUs.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct PricingActions {
    pub avg_price_change: BTreeMap<Period, Figure>,
    pub price_change_distribution: BTreeMap<Period, ChangeDistribution>,
}

/// Mean current price per SKU and period. Observations without a SKU are left out.
pub fn sku_price_table(observations: &[Observation]) -> BTreeMap<String, BTreeMap<Period, f64>> {
    let mut sums: BTreeMap<String, BTreeMap<Period, (f64, usize)>> = BTreeMap::new();
    for obs in observations {
        let Some(sku) = &obs.sku else { continue };
        let cell = sums
            .entry(sku.clone())
            .or_default()
            .entry(obs.period)
            .or_insert((0.0, 0));
        cell.0 += obs.current_price;
        cell.1 += 1;
    }

    sums.into_iter()
        .map(|(sku, periods)| {
            let means = periods
                .into_iter()
                .map(|(period, (sum, n))| (period, sum / n as f64))
                .collect();
            (sku, means)
        })
        .collect()
}

/// Percentage change of each SKU's price from one period to the next.
///
/// Periods are every period present in the table. A SKU's last observed price
/// carries forward across periods where it was not seen, so a gap reads as an
/// unchanged price. Periods before a SKU's first observation are absent; its
/// first period has no change, and neither does a move from a zero price.
pub fn sku_price_changes(
    table: &BTreeMap<String, BTreeMap<Period, f64>>,
) -> BTreeMap<String, BTreeMap<Period, Figure>> {
    let periods: BTreeSet<Period> = table.values().flat_map(|p| p.keys().copied()).collect();

    table
        .iter()
        .map(|(sku, prices)| {
            let mut previous: Option<f64> = None;
            let changes = periods
                .iter()
                .filter_map(|period| {
                    let price = prices.get(period).copied().or(previous)?;
                    let change = previous.and_then(|p| pct_change(p, price));
                    previous = Some(price);
                    Some((*period, Figure::from(change)))
                })
                .collect();
            (sku.clone(), changes)
        })
        .collect()
}

/// Cross-sectional summary of SKU price changes for every period.
pub fn analyze_pricing_actions(observations: &[Observation]) -> PricingActions {
    let changes = sku_price_changes(&sku_price_table(observations));

    let mut by_period: BTreeMap<Period, Vec<f64>> = BTreeMap::new();
    for per_sku in changes.values() {
        for (period, change) in per_sku {
            let bucket = by_period.entry(*period).or_default();
            if let Some(v) = change.value() {
                bucket.push(v);
            }
        }
    }

    let mut actions = PricingActions::default();
    for (period, values) in by_period {
        let avg = Figure::from(mean(&values));
        actions.avg_price_change.insert(period, avg);
        actions.price_change_distribution.insert(
            period,
            ChangeDistribution {
                mean: avg,
                median: median(&values).into(),
                std: sample_std(&values).into(),
            },
        );
    }
    actions
}
