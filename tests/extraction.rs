use asp_decomposition::extract::{extract_page, BlockOutcome, NotAProduct};
use asp_decomposition::model::{Category, Channel, Source};

use chrono::NaiveDate;

const LISTING: &str = r#"
<html>
  <body>
    <div class="product-grid">
      <div class="product-tile">
        <h3 class="product-name">Arizona Big Buckle</h3>
        <span class="price">$124.95</span>
        <span class="regular-price">$149.95</span>
        <span class="badge">New</span>
      </div>
      <div class="product-tile">
        <h3 class="product-name">Boston Suede Leather</h3>
        <div class="availability">Available at your local retailer</div>
      </div>
      <div class="product-card">
        <span class="product-title">Zermatt Shearling</span>
        <div class="current-price">USD 130</div>
        <p>Model: ZRM-2001</p>
      </div>
      <div class="product-card">
        <span class="product-title">Gizeh</span>
        <div class="current-price">Price on request</div>
      </div>
    </div>
  </body>
</html>
"#;

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 9, 1).unwrap()
}

#[test]
fn listing_page_keeps_only_priced_products() {
    let page = extract_page(LISTING, Category::Clogs, date(), Source::Historical).unwrap();

    assert_eq!(page.observations.len(), 2);
    assert_eq!(page.not_a_product, 1);
    assert_eq!(page.malformed, 1);
    assert!(page.observations.iter().all(|o| o.current_price > 0.0));
    assert!(!page.observations.iter().any(|o| o.name.starts_with("Boston")));

    let arizona = &page.observations[0];
    assert_eq!(arizona.current_price, 124.95);
    assert_eq!(arizona.original_price, 149.95);
    assert_eq!(arizona.discount_amount, 25.0);
    assert_eq!(arizona.discount_percentage, 16.67);
    assert!(arizona.is_new_product);
    assert_eq!(arizona.channel, Channel::Dtc);

    let zermatt = &page.observations[1];
    assert_eq!(zermatt.sku.as_deref(), Some("ZRM-2001"));
    assert_eq!(zermatt.discount_amount, 0.0);
    assert_eq!(zermatt.discount_percentage, 0.0);
}

#[test]
fn discount_invariants_hold_for_every_observation() {
    let page = extract_page(LISTING, Category::Sandals, date(), Source::Historical).unwrap();
    for o in &page.observations {
        let expected = (o.original_price - o.current_price).max(0.0);
        assert!((o.discount_amount - expected).abs() < 0.005);
        if o.discount_amount == 0.0 {
            assert_eq!(o.discount_percentage, 0.0);
        }
        assert!(o.original_price >= o.current_price);
    }
}

#[test]
fn block_missing_price_is_classified() {
    let outcomes = asp_decomposition::extract::extract_blocks(
        LISTING,
        Category::Boots,
        date(),
        Source::Historical,
    )
    .unwrap();
    assert_eq!(outcomes.len(), 4);
    assert_eq!(outcomes[1], BlockOutcome::NotAProduct(NotAProduct::MissingPrice));
    assert!(matches!(outcomes[3], BlockOutcome::Malformed(_)));
}
