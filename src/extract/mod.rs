//! Field extraction from archived category listing pages.
//!
//! A page is split into product blocks; every block yields exactly one
//! [`BlockOutcome`], so a bad block never stops the rest of the page.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use tracing::debug;

use crate::model::{Category, Observation, Pricing, Source};

pub mod heuristics;
pub mod price;

static PRODUCT_BLOCK: Lazy<Option<Selector>> = Lazy::new(|| {
    Selector::parse(
        "div.product-tile, div.product-card, div.product-item, \
         div.product-grid-item, div.product-list-item",
    )
    .ok()
});

static PRODUCT_NAME: Lazy<Option<Selector>> = Lazy::new(|| {
    Selector::parse(
        "h3.product-name, h3.product-title, h3.name, \
         div.product-name, div.product-title, div.name, \
         span.product-name, span.product-title, span.name",
    )
    .ok()
});

static CURRENT_PRICE: Lazy<Option<Selector>> = Lazy::new(|| {
    Selector::parse(
        "span.price, span.product-price, span.current-price, \
         div.price, div.product-price, div.current-price",
    )
    .ok()
});

static ORIGINAL_PRICE: Lazy<Option<Selector>> = Lazy::new(|| {
    Selector::parse(
        "span.original-price, span.was-price, span.regular-price, \
         div.original-price, div.was-price, div.regular-price",
    )
    .ok()
});

/// A product block that looked like a product but could not be read.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BlockError {
    #[error("unparseable {field} price {text:?}")]
    InvalidPrice { field: &'static str, text: String },

    #[error("selector {0} failed to compile")]
    Selector(&'static str),
}

/// Why a block was discarded without being an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotAProduct {
    MissingName,
    MissingPrice,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BlockOutcome {
    Parsed(Observation),
    NotAProduct(NotAProduct),
    Malformed(BlockError),
}

/// Everything recovered from one page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageExtraction {
    pub observations: Vec<Observation>,
    pub not_a_product: usize,
    pub malformed: usize,
}

impl PageExtraction {
    pub fn blocks_seen(&self) -> usize {
        self.observations.len() + self.not_a_product + self.malformed
    }
}

impl FromIterator<BlockOutcome> for PageExtraction {
    fn from_iter<I: IntoIterator<Item = BlockOutcome>>(iter: I) -> Self {
        let mut page = PageExtraction::default();
        for outcome in iter {
            match outcome {
                BlockOutcome::Parsed(obs) => page.observations.push(obs),
                BlockOutcome::NotAProduct(_) => page.not_a_product += 1,
                BlockOutcome::Malformed(err) => {
                    debug!(target: "extract", error = %err, "skipping product block");
                    page.malformed += 1;
                }
            }
        }
        page
    }
}

fn selector(sel: &'static Lazy<Option<Selector>>, name: &'static str) -> Result<&'static Selector, BlockError> {
    sel.as_ref().ok_or(BlockError::Selector(name))
}

fn text_of(el: ElementRef<'_>) -> String {
    el.text().collect()
}

fn read_block(
    block: ElementRef<'_>,
    category: Category,
    date: NaiveDate,
    source: Source,
) -> BlockOutcome {
    match try_read_block(block, category, date, source) {
        Ok(outcome) => outcome,
        Err(err) => BlockOutcome::Malformed(err),
    }
}

fn try_read_block(
    block: ElementRef<'_>,
    category: Category,
    date: NaiveDate,
    source: Source,
) -> Result<BlockOutcome, BlockError> {
    let Some(name_el) = block.select(selector(&PRODUCT_NAME, "name")?).next() else {
        return Ok(BlockOutcome::NotAProduct(NotAProduct::MissingName));
    };
    let name = text_of(name_el).trim().to_string();

    let Some(price_el) = block.select(selector(&CURRENT_PRICE, "price")?).next() else {
        return Ok(BlockOutcome::NotAProduct(NotAProduct::MissingPrice));
    };
    let current = price::parse_price("current", &text_of(price_el))?;
    let original = block
        .select(selector(&ORIGINAL_PRICE, "original price")?)
        .next()
        .map(|el| price::parse_price("original", &text_of(el)))
        .transpose()?;

    let markup = block.html();
    let obs = Observation::new(
        name.clone(),
        heuristics::sku(&markup, &name),
        category,
        heuristics::channel(&markup),
        Pricing::new(current, original),
        heuristics::is_new_product(&markup, &name),
        date,
        source,
    );
    Ok(BlockOutcome::Parsed(obs))
}

/// Classify every product block on a page.
pub fn extract_blocks(
    html: &str,
    category: Category,
    date: NaiveDate,
    source: Source,
) -> Result<Vec<BlockOutcome>, BlockError> {
    let document = Html::parse_document(html);
    let blocks = selector(&PRODUCT_BLOCK, "product block")?;
    Ok(document
        .select(blocks)
        .map(|block| read_block(block, category, date, source))
        .collect())
}

/// Extract all observations from one page, counting the blocks that were dropped.
pub fn extract_page(
    html: &str,
    category: Category,
    date: NaiveDate,
    source: Source,
) -> Result<PageExtraction, BlockError> {
    Ok(extract_blocks(html, category, date, source)?
        .into_iter()
        .collect())
}
