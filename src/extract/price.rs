use super::BlockError;

/// Strip everything except ASCII digits and `.` then parse as a price.
///
/// `"$1,234.50"` becomes `1234.5`. Text with no digits, or with more than
/// one decimal point, is rejected.
pub fn parse_price(field: &'static str, text: &str) -> Result<f64, BlockError> {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    let invalid = || BlockError::InvalidPrice {
        field,
        text: text.trim().to_string(),
    };

    if !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    let value = cleaned.parse::<f64>().map_err(|_| invalid())?;
    if !value.is_finite() {
        return Err(invalid());
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_and_separators_stripped() {
        assert_eq!(parse_price("current", "$1,234.50").unwrap(), 1234.5);
        assert_eq!(parse_price("current", "  USD 99 ").unwrap(), 99.0);
        assert_eq!(parse_price("current", "€ 110.00*").unwrap(), 110.0);
    }

    #[test]
    fn test_rejects_text_without_digits() {
        assert!(matches!(
            parse_price("current", "Sold out"),
            Err(BlockError::InvalidPrice { field: "current", .. })
        ));
        assert!(parse_price("current", "").is_err());
    }

    #[test]
    fn test_rejects_ambiguous_decimal_points() {
        assert!(parse_price("original", "1.234.56").is_err());
    }
}
