//! ASP trend analysis over a finished observation table.
//!
//! Every function here is pure: the same observations always produce the
//! same tables, and nothing is cached between calls.

use std::collections::BTreeMap;

use serde::{Serialize, Serializer};

use crate::model::{Dimension, Observation};
use crate::utils::time::Period;

pub mod mix;
pub mod overall;
pub mod pricing;
pub mod promo;

pub use mix::{calculate_mix_impact, MixImpact};
pub use overall::{analyze_overall_asp, MonthlyAsp, OverallTrend, YoyGrowth};
pub use pricing::{analyze_pricing_actions, ChangeDistribution, PricingActions};
pub use promo::{analyze_promotional_impact, PromoSummary};

/// Text written in place of numbers that have no defined value.
pub const UNDEFINED_PLACEHOLDER: &str = "NaN";

/// A result number that may be undefined (no prior-year base, too few samples).
///
/// Serializes as a JSON number, or as [`UNDEFINED_PLACEHOLDER`] when undefined.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Figure {
    Value(f64),
    Undefined,
}

impl Figure {
    pub fn value(&self) -> Option<f64> {
        match self {
            Figure::Value(v) => Some(*v),
            Figure::Undefined => None,
        }
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, Figure::Value(_))
    }
}

impl From<Option<f64>> for Figure {
    fn from(value: Option<f64>) -> Self {
        match value {
            Some(v) if v.is_finite() => Figure::Value(v),
            _ => Figure::Undefined,
        }
    }
}

impl Serialize for Figure {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Figure::Value(v) => serializer.serialize_f64(*v),
            Figure::Undefined => serializer.serialize_str(UNDEFINED_PLACEHOLDER),
        }
    }
}

/// Bucket observations by calendar month, chronologically.
pub fn group_by_period(observations: &[Observation]) -> BTreeMap<Period, Vec<&Observation>> {
    let mut periods: BTreeMap<Period, Vec<&Observation>> = BTreeMap::new();
    for obs in observations {
        periods.entry(obs.period).or_default().push(obs);
    }
    periods
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProductMix {
    pub category_mix: MixImpact,
    pub new_vs_existing: MixImpact,
}

/// The six analyses written to the result document.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AspAnalysis {
    pub overall_asp_trends: OverallTrend,
    pub product_mix_impact: ProductMix,
    pub channel_mix_impact: MixImpact,
    pub style_mix_impact: MixImpact,
    pub pricing_actions: PricingActions,
    pub promotional_impact: BTreeMap<Period, PromoSummary>,
}

pub fn analyze_asp_trends(observations: &[Observation]) -> AspAnalysis {
    AspAnalysis {
        overall_asp_trends: analyze_overall_asp(observations),
        product_mix_impact: ProductMix {
            category_mix: calculate_mix_impact(observations, Dimension::Category),
            new_vs_existing: calculate_mix_impact(observations, Dimension::IsNewProduct),
        },
        channel_mix_impact: calculate_mix_impact(observations, Dimension::Channel),
        style_mix_impact: calculate_mix_impact(observations, Dimension::Style),
        pricing_actions: analyze_pricing_actions(observations),
        promotional_impact: analyze_promotional_impact(observations),
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::NaiveDate;

    use crate::model::{Category, Channel, Observation, Pricing, Source};

    pub fn obs(date: &str, category: Category, price: f64) -> Observation {
        priced(date, category, price, None, None)
    }

    pub fn priced(
        date: &str,
        category: Category,
        current: f64,
        original: Option<f64>,
        sku: Option<&str>,
    ) -> Observation {
        Observation::new(
            format!("{category} item"),
            sku.map(str::to_string),
            category,
            Channel::Dtc,
            Pricing::new(current, original),
            false,
            NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            Source::Historical,
        )
    }
}
