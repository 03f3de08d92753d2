use crate::model::NOT_INFORMED;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Textual nulls spreadsheets and exports leave behind.
fn is_placeholder(s: &str) -> bool {
    s.is_empty()
        || s.eq_ignore_ascii_case("null")
        || s.eq_ignore_ascii_case("none")
        || s.eq_ignore_ascii_case("nan")
}

/// Normalize a categorical cell (UTM fields).
///
/// Absent, empty and placeholder cells become [`NOT_INFORMED`].
pub fn normalize_category(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        Some(s) if !is_placeholder(s) => s.to_string(),
        _ => NOT_INFORMED.to_string(),
    }
}

/// Keep only the digits of a postal code: "01310-100" -> "01310100".
pub fn normalize_postal_code(raw: Option<&str>) -> String {
    let digits: String = raw
        .unwrap_or_default()
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect();
    if digits.is_empty() {
        NOT_INFORMED.to_string()
    } else {
        digits
    }
}

/// Parse a currency cell into a non-negative decimal.
///
/// Handles formats like:
/// - "1.234,56" -> 1234.56 (dots are thousands separators once a comma is present)
/// - "R$ 99,90" -> 99.90
/// - "150.5" -> 150.5
/// - "", "nan", "abc" -> 0
pub fn parse_value(raw: Option<&str>) -> Decimal {
    let s = raw.unwrap_or_default().trim();
    if is_placeholder(s) {
        return Decimal::ZERO;
    }

    let kept: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .collect();

    let normalized = if kept.contains(',') {
        kept.replace('.', "").replace(',', ".")
    } else {
        kept
    };

    match Decimal::from_str(&normalized) {
        Ok(v) if v.is_sign_negative() => Decimal::ZERO,
        Ok(v) => v,
        Err(_) => Decimal::ZERO,
    }
}
