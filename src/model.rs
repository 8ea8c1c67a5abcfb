use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::utils::{math::round2, time::Period};

/// Catalog categories crawled on the storefront.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Sandals,
    Clogs,
    Boots,
    Shoes,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Sandals,
        Category::Clogs,
        Category::Boots,
        Category::Shoes,
    ];

    /// Path segment of the category listing page.
    pub fn slug(&self) -> &'static str {
        match self {
            Category::Sandals => "sandals",
            Category::Clogs => "clogs",
            Category::Boots => "boots",
            Category::Shoes => "shoes",
        }
    }

    /// Fixed category → style lookup.
    pub fn style(&self) -> Style {
        match self {
            Category::Sandals => Style::Open,
            Category::Clogs | Category::Boots | Category::Shoes => Style::ClosedToe,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Style {
    Open,
    ClosedToe,
}

impl Style {
    pub fn as_str(&self) -> &'static str {
        match self {
            Style::Open => "open",
            Style::ClosedToe => "closed-toe",
        }
    }
}

/// Distribution channel inferred from listing text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Dtc,
    Wholesale,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Dtc => "dtc",
            Channel::Wholesale => "wholesale",
        }
    }
}

/// Where an observation was captured from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Historical,
}

/// Observed list/selling price pair with the discount derived from it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pricing {
    pub current_price: f64,
    pub original_price: f64,
    pub discount_amount: f64,
    pub discount_percentage: f64,
}

impl Pricing {
    /// Derive discount fields from a current price and an optional list price.
    ///
    /// A missing or lower list price collapses to the current price, so the
    /// discount is never negative.
    pub fn new(current_price: f64, original_price: Option<f64>) -> Self {
        let original_price = original_price
            .unwrap_or(current_price)
            .max(current_price);
        let discount_amount = if original_price > current_price {
            round2(original_price - current_price)
        } else {
            0.0
        };
        let discount_percentage = if discount_amount > 0.0 {
            round2(discount_amount / original_price * 100.0)
        } else {
            0.0
        };
        Self {
            current_price,
            original_price,
            discount_amount,
            discount_percentage,
        }
    }
}

/// One product seen on one archived listing page.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Observation {
    pub name: String,
    pub sku: Option<String>,
    pub category: Category,
    pub style: Style,
    pub channel: Channel,
    pub current_price: f64,
    pub original_price: f64,
    pub discount_amount: f64,
    pub discount_percentage: f64,
    pub is_new_product: bool,
    pub date: NaiveDate,
    pub period: Period,
    pub source: Source,
}

impl Observation {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: String,
        sku: Option<String>,
        category: Category,
        channel: Channel,
        pricing: Pricing,
        is_new_product: bool,
        date: NaiveDate,
        source: Source,
    ) -> Self {
        Self {
            name,
            sku,
            category,
            style: category.style(),
            channel,
            current_price: pricing.current_price,
            original_price: pricing.original_price,
            discount_amount: pricing.discount_amount,
            discount_percentage: pricing.discount_percentage,
            is_new_product,
            date,
            period: Period::from_date(date),
            source,
        }
    }
}

/// Categorical axis the decomposition can be run over.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Category,
    Channel,
    Style,
    IsNewProduct,
}

impl Dimension {
    /// Value of this dimension for one observation, as a table key.
    pub fn value_of(&self, obs: &Observation) -> String {
        match self {
            Dimension::Category => obs.category.slug().to_string(),
            Dimension::Channel => obs.channel.as_str().to_string(),
            Dimension::Style => obs.style.as_str().to_string(),
            Dimension::IsNewProduct => obs.is_new_product.to_string(),
        }
    }
}
