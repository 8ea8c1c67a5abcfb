use std::collections::BTreeMap;

use serde::Serialize;

use super::{group_by_period, Figure};
use crate::model::Observation;
use crate::utils::math::{mean, median, pct_change, round2};
use crate::utils::time::Period;

/// Number of periods between a value and its year-over-year base.
pub const YOY_LAG_PERIODS: usize = 12;

/// Monthly price summary, rounded to cents.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MonthlyAsp {
    pub current_price_mean: f64,
    pub current_price_median: f64,
    pub current_price_count: usize,
    pub original_price_mean: f64,
}

/// Year-over-year percentage change of each [`MonthlyAsp`] series.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct YoyGrowth {
    pub current_price_mean: Figure,
    pub current_price_median: Figure,
    pub current_price_count: Figure,
    pub original_price_mean: Figure,
}

impl YoyGrowth {
    fn undefined() -> Self {
        Self {
            current_price_mean: Figure::Undefined,
            current_price_median: Figure::Undefined,
            current_price_count: Figure::Undefined,
            original_price_mean: Figure::Undefined,
        }
    }

    fn between(prior: &MonthlyAsp, current: &MonthlyAsp) -> Self {
        Self {
            current_price_mean: pct_change(prior.current_price_mean, current.current_price_mean).into(),
            current_price_median: pct_change(prior.current_price_median, current.current_price_median)
                .into(),
            current_price_count: pct_change(
                prior.current_price_count as f64,
                current.current_price_count as f64,
            )
            .into(),
            original_price_mean: pct_change(prior.original_price_mean, current.original_price_mean)
                .into(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct OverallTrend {
    pub monthly_asp: BTreeMap<Period, MonthlyAsp>,
    pub yoy_growth: BTreeMap<Period, YoyGrowth>,
}

/// Monthly ASP statistics plus their change versus twelve periods earlier.
///
/// The lag counts periods present in the table, in chronological order, so
/// the first twelve periods never have a defined growth figure.
pub fn analyze_overall_asp(observations: &[Observation]) -> OverallTrend {
    let monthly_asp: BTreeMap<Period, MonthlyAsp> = group_by_period(observations)
        .into_iter()
        .map(|(period, rows)| {
            let current: Vec<f64> = rows.iter().map(|o| o.current_price).collect();
            let original: Vec<f64> = rows.iter().map(|o| o.original_price).collect();
            let summary = MonthlyAsp {
                current_price_mean: mean(&current).map(round2).unwrap_or_default(),
                current_price_median: median(&current).map(round2).unwrap_or_default(),
                current_price_count: current.len(),
                original_price_mean: mean(&original).map(round2).unwrap_or_default(),
            };
            (period, summary)
        })
        .collect();

    let ordered: Vec<(&Period, &MonthlyAsp)> = monthly_asp.iter().collect();
    let yoy_growth = ordered
        .iter()
        .enumerate()
        .map(|(i, (period, summary))| {
            let growth = match i.checked_sub(YOY_LAG_PERIODS) {
                Some(j) => YoyGrowth::between(ordered[j].1, summary),
                None => YoyGrowth::undefined(),
            };
            (**period, growth)
        })
        .collect();

    OverallTrend {
        monthly_asp,
        yoy_growth,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::fixtures::{obs, priced};
    use crate::model::Category;

    fn monthly_series(months: usize) -> Vec<Observation> {
        (0..months)
            .map(|i| {
                let year = 2020 + (i / 12) as i32;
                let month = (i % 12) + 1;
                let price = 100.0 + i as f64;
                obs(&format!("{year}-{month:02}-15"), Category::Sandals, price)
            })
            .collect()
    }

    #[test]
    fn test_monthly_summary_is_rounded() {
        let table = vec![
            priced("2020-01-02", Category::Clogs, 10.0, Some(20.0), None),
            priced("2020-01-09", Category::Clogs, 10.0, None, None),
            priced("2020-01-20", Category::Clogs, 20.01, None, None),
        ];
        let trend = analyze_overall_asp(&table);
        let jan = &trend.monthly_asp[&"2020-01".parse::<Period>().unwrap()];
        assert_eq!(jan.current_price_mean, 13.34);
        assert_eq!(jan.current_price_median, 10.0);
        assert_eq!(jan.current_price_count, 3);
        assert_eq!(jan.original_price_mean, 16.67);
    }

    #[test]
    fn test_first_twelve_periods_have_no_yoy() {
        let trend = analyze_overall_asp(&monthly_series(14));
        let growth: Vec<&YoyGrowth> = trend.yoy_growth.values().collect();
        assert_eq!(growth.len(), 14);
        for g in &growth[..12] {
            assert_eq!(g.current_price_mean, Figure::Undefined);
            assert_eq!(g.current_price_count, Figure::Undefined);
        }
        // 2021-01 at 112 against 2020-01 at 100
        let jan = growth[12].current_price_mean.value().unwrap();
        assert!((jan - 12.0).abs() < 1e-9);
        assert_eq!(growth[13].current_price_count, Figure::Value(0.0));
    }

    #[test]
    fn test_lag_is_positional_over_present_periods() {
        let mut table = monthly_series(12);
        table.push(obs("2022-06-15", Category::Sandals, 50.0));
        let trend = analyze_overall_asp(&table);
        let last = trend.yoy_growth.values().last().unwrap();
        // Base is the first period present (2020-01, price 100).
        assert!((last.current_price_mean.value().unwrap() + 50.0).abs() < 1e-9);
    }
}
