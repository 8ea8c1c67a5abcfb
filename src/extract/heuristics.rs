use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::Channel;

static SKU_MARKUP_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"SKU:\s*([A-Z0-9-]+)",
        r"Model:\s*([A-Z0-9-]+)",
        r"Item\s*#:\s*([A-Z0-9-]+)",
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

static SKU_IN_NAME: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"[A-Z0-9]{6,}").ok());

const NEW_MARKERS: [&str; 3] = ["new", "new arrival", "just in"];
const WHOLESALE_MARKERS: [&str; 3] = ["wholesale", "retailer", "dealer"];

/// Labelled identifier in the block markup (`SKU:`, `Model:`, `Item #:`).
pub fn sku_from_markup(markup: &str) -> Option<String> {
    SKU_MARKUP_PATTERNS
        .iter()
        .find_map(|re| re.captures(markup))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Run of six or more uppercase letters/digits in the name, spaces removed.
pub fn sku_from_name(name: &str) -> Option<String> {
    let compact: String = name.chars().filter(|c| *c != ' ').collect();
    SKU_IN_NAME
        .as_ref()?
        .find(&compact)
        .map(|m| m.as_str().to_string())
}

pub fn sku(markup: &str, name: &str) -> Option<String> {
    sku_from_markup(markup).or_else(|| sku_from_name(name))
}

/// Loose substring check over the whole block, markup included.
pub fn is_new_product(markup: &str, name: &str) -> bool {
    let markup = markup.to_lowercase();
    let name = name.to_lowercase();
    NEW_MARKERS
        .iter()
        .any(|m| markup.contains(m) || name.contains(m))
}

pub fn channel(markup: &str) -> Channel {
    let markup = markup.to_lowercase();
    if WHOLESALE_MARKERS.iter().any(|m| markup.contains(m)) {
        Channel::Wholesale
    } else {
        Channel::Dtc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sku_label_precedence() {
        let markup = r#"<div>Model: ARZ-100 <span>SKU: 0051793</span></div>"#;
        assert_eq!(sku_from_markup(markup).as_deref(), Some("0051793"));
        assert_eq!(
            sku_from_markup("<p>Item #: BK-77</p>").as_deref(),
            Some("BK-77")
        );
        assert_eq!(sku_from_markup("<p>no label</p>"), None);
    }

    #[test]
    fn test_sku_falls_back_to_name() {
        assert_eq!(sku("<div></div>", "Arizona BF 051 793").as_deref(), Some("BF051793"));
        assert_eq!(sku("<div></div>", "Boston Soft Footbed"), None);
    }

    #[test]
    fn test_new_markers() {
        assert!(is_new_product("<span class=\"badge\">New Arrival</span>", "Arizona"));
        assert!(is_new_product("<div></div>", "Just In: Boston"));
        assert!(!is_new_product("<div>Classic</div>", "Arizona"));
    }

    #[test]
    fn test_channel() {
        assert_eq!(channel("<div>Find a Retailer near you</div>"), Channel::Wholesale);
        assert_eq!(channel("<div>Add to cart</div>"), Channel::Dtc);
    }
}
