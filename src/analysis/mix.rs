//! Mix / price decomposition of ASP movement along one categorical dimension.
//!
//! Relative to the earliest period `b`, for every period `t`:
//!
//! ```text
//! mix_impact[t]   = Σ_v (mix[t][v] − mix[b][v]) × asp[b][v]
//! price_impact[t] = Σ_v (asp[t][v] − asp[b][v]) × mix[t][v]
//! ```
//!
//! Price impact is weighted by the current period's mix. No correction term
//! is added for values that enter or leave the table after the base period;
//! those values are left out of both sums, so the two impacts only add up to
//! the ASP change when every value is present in both periods.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::model::{Dimension, Observation};
use crate::utils::time::Period;

/// Per-period, per-value table; absent combinations are simply missing.
pub type PeriodTable = BTreeMap<Period, BTreeMap<String, f64>>;

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct MixImpact {
    /// Mean current price per period and dimension value.
    pub asp_by_dimension: PeriodTable,
    /// Share of the period's observations held by each value; rows sum to 1.
    pub mix_percentages: PeriodTable,
    pub mix_impact: BTreeMap<Period, f64>,
    pub price_impact: BTreeMap<Period, f64>,
}

#[derive(Default)]
struct Bucket {
    price_sum: f64,
    count: usize,
}

/// Decompose ASP change along `dimension`, using the earliest period as base.
pub fn calculate_mix_impact(observations: &[Observation], dimension: Dimension) -> MixImpact {
    let mut buckets: BTreeMap<Period, BTreeMap<String, Bucket>> = BTreeMap::new();
    for obs in observations {
        let bucket = buckets
            .entry(obs.period)
            .or_default()
            .entry(dimension.value_of(obs))
            .or_default();
        bucket.price_sum += obs.current_price;
        bucket.count += 1;
    }

    let mut asp_by_dimension = PeriodTable::new();
    let mut mix_percentages = PeriodTable::new();
    for (period, values) in &buckets {
        let total: usize = values.values().map(|b| b.count).sum();
        let asp_row = asp_by_dimension.entry(*period).or_default();
        let mix_row = mix_percentages.entry(*period).or_default();
        for (value, bucket) in values {
            asp_row.insert(value.clone(), bucket.price_sum / bucket.count as f64);
            mix_row.insert(value.clone(), bucket.count as f64 / total as f64);
        }
    }

    let empty = BTreeMap::new();
    let asp_base = asp_by_dimension.values().next().unwrap_or(&empty);
    let mix_base = mix_percentages.values().next().unwrap_or(&empty);

    let mut mix_impact = BTreeMap::new();
    let mut price_impact = BTreeMap::new();
    for (period, mix_row) in &mix_percentages {
        let asp_row = asp_by_dimension.get(period).unwrap_or(&empty);

        let mut mix_term = 0.0;
        let mut price_term = 0.0;
        for (value, mix) in mix_row {
            let (Some(base_mix), Some(base_asp)) = (mix_base.get(value), asp_base.get(value)) else {
                continue;
            };
            mix_term += (mix - base_mix) * base_asp;
            if let Some(asp) = asp_row.get(value) {
                price_term += (asp - base_asp) * mix;
            }
        }

        mix_impact.insert(*period, mix_term);
        price_impact.insert(*period, price_term);
    }

    MixImpact {
        asp_by_dimension,
        mix_percentages,
        mix_impact,
        price_impact,
    }
}

impl MixImpact {
    /// Chronologically first period, the reference for both impact series.
    pub fn base_period(&self) -> Option<Period> {
        self.mix_percentages.keys().next().copied()
    }
}
