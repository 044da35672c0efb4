//! Text formatting of values and changes.

use mwlite_core::Category;

/// Placeholder for values that cannot be shown.
pub const NOT_AVAILABLE: &str = "N/A";

/// Fraction digits shown for a category.
pub fn decimals_for(category: Category) -> usize {
    match category {
        Category::Forex => 4,
        _ => 2,
    }
}

/// Fixed-point text with thousands separators, e.g. `65,000.00`.
pub fn format_number(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }

    let digits = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (digits.as_str(), None),
    };

    let mut grouped = String::with_capacity(digits.len() + int_part.len() / 3 + 1);
    // No sign for values that round to zero.
    if value < 0.0 && digits.bytes().any(|b| b.is_ascii_digit() && b != b'0') {
        grouped.push('-');
    }
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if let Some(frac_part) = frac_part {
        grouped.push('.');
        grouped.push_str(frac_part);
    }
    grouped
}

/// Value as shown on a card: `$` prefix for crypto, `%` suffix for bond
/// yields.
pub fn display_value(category: Category, value: f64) -> String {
    let number = format_number(value, decimals_for(category));
    if !value.is_finite() {
        return number;
    }
    match category {
        Category::Crypto => format!("${number}"),
        Category::Bond => format!("{number}%"),
        Category::EquityIndex | Category::Forex => number,
    }
}

/// Absolute change text, e.g. `29.70` or `-0.0035`.
pub fn change_text(category: Category, change: f64) -> String {
    format_number(change, decimals_for(category))
}

/// Parenthesized percent change: `(10.00%)`, `(∞%)`, `(-∞%)`.
///
/// NaN reads as no change.
pub fn percent_text(pct: f64) -> String {
    if pct == f64::INFINITY {
        "(∞%)".to_string()
    } else if pct == f64::NEG_INFINITY {
        "(-∞%)".to_string()
    } else if pct.is_nan() {
        "(0.00%)".to_string()
    } else {
        format!("({}%)", format_number(pct, 2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number_groups_thousands() {
        assert_eq!(format_number(65000.0, 2), "65,000.00");
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(999.999, 2), "1,000.00");
        assert_eq!(format_number(0.52, 2), "0.52");
        assert_eq!(format_number(-1500.5, 2), "-1,500.50");
        assert_eq!(format_number(123.0, 0), "123");
    }

    #[test]
    fn test_format_number_drops_sign_of_rounded_zero() {
        assert_eq!(format_number(-0.001, 2), "0.00");
        assert_eq!(format_number(f64::NAN, 2), NOT_AVAILABLE);
    }

    #[test]
    fn test_display_value_per_category() {
        assert_eq!(display_value(Category::Crypto, 65000.0), "$65,000.00");
        assert_eq!(display_value(Category::EquityIndex, 5400.5), "5,400.50");
        assert_eq!(display_value(Category::Forex, 1.085), "1.0850");
        assert_eq!(display_value(Category::Bond, 4.25), "4.25%");
        assert_eq!(display_value(Category::Crypto, f64::INFINITY), NOT_AVAILABLE);
    }

    #[test]
    fn test_percent_text() {
        assert_eq!(percent_text(10.0), "(10.00%)");
        assert_eq!(percent_text(-2.346), "(-2.35%)");
        assert_eq!(percent_text(0.0), "(0.00%)");
        assert_eq!(percent_text(f64::INFINITY), "(∞%)");
        assert_eq!(percent_text(f64::NEG_INFINITY), "(-∞%)");
        assert_eq!(percent_text(f64::NAN), "(0.00%)");
    }

    #[test]
    fn test_change_text() {
        assert_eq!(change_text(Category::EquityIndex, 29.7), "29.70");
        assert_eq!(change_text(Category::Forex, -0.0035), "-0.0035");
    }
}
