//! Locale-tolerant parsing of spreadsheet cells
//!
//! Exports from different systems disagree on number formatting:
//! `1.234.567,00` and `1,234,567.00` are the same amount. The last
//! separator decides:
//!
//! - both `.` and `,` present: whichever comes last is the decimal mark
//! - one kind, several times: thousands grouping
//! - one kind, once: grouping when exactly three digits follow a short
//!   non-zero leading group (`1.500`, `12,000`), decimal mark otherwise
//!   (`1,5`, `0.125`)
//!
//! Whitespace and an `Rp` currency prefix are ignored. A leading `-` or
//! surrounding parentheses make the value negative.

use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Accepted date layouts, tried in order
pub const DATE_FORMATS: [&str; 3] = ["%d/%m/%Y", "%Y-%m-%d", "%d-%m-%Y"];

/// Parses a number written in either decimal convention
pub fn parse_number(raw: &str) -> Option<Decimal> {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    let mut body = compact.as_str();
    let mut negative = false;

    if let Some(inner) = body.strip_prefix('(').and_then(|rest| rest.strip_suffix(')')) {
        negative = true;
        body = inner;
    }
    if let Some(rest) = body.strip_prefix('-') {
        negative = true;
        body = rest;
    }
    body = strip_currency(body);
    if !negative {
        if let Some(rest) = body.strip_prefix('-') {
            negative = true;
            body = rest;
        }
    }

    let normalized = normalize_separators(body)?;
    let value = Decimal::from_str(&normalized).ok()?;
    Some(if negative { -value } else { value })
}

/// Parses a whole, non-negative count such as days past due
pub fn parse_count(raw: &str) -> Option<u32> {
    let value = parse_number(raw)?;
    if value < Decimal::ZERO || !value.fract().is_zero() {
        return None;
    }
    value.to_u32()
}

/// Parses a date in one of [`DATE_FORMATS`]
///
/// Years outside 1900..=9999 are rejected so two-digit years are not
/// silently read as the first century.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let value = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        .filter(|date| (1900..=9999).contains(&date.year()))
}

fn strip_currency(body: &str) -> &str {
    match body.get(..2) {
        Some(prefix) if prefix.eq_ignore_ascii_case("rp") => {
            let rest = &body[2..];
            rest.strip_prefix('.').unwrap_or(rest)
        }
        _ => body,
    }
}

/// Rewrites `body` into the plain `1234567.89` form
fn normalize_separators(body: &str) -> Option<String> {
    if !body.chars().all(|c| c.is_ascii_digit() || c == '.' || c == ',') {
        return None;
    }
    if !body.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let decimal_mark = match (body.rfind('.'), body.rfind(',')) {
        (Some(dot), Some(comma)) => Some(if dot > comma { '.' } else { ',' }),
        (Some(position), None) | (None, Some(position)) => {
            let separator = body[position..].chars().next()?;
            if body.matches(separator).count() > 1 || is_thousands_group(body, position) {
                None
            } else {
                Some(separator)
            }
        }
        (None, None) => None,
    };

    if let Some(mark) = decimal_mark {
        if body.matches(mark).count() > 1 {
            return None;
        }
    }

    let mut normalized = String::with_capacity(body.len() + 1);
    for c in body.chars() {
        if c.is_ascii_digit() {
            normalized.push(c);
        } else if Some(c) == decimal_mark {
            if normalized.is_empty() {
                normalized.push('0');
            }
            normalized.push('.');
        }
    }
    Some(normalized)
}

fn is_thousands_group(body: &str, separator: usize) -> bool {
    let (leading, trailing) = (&body[..separator], &body[separator + 1..]);
    trailing.len() == 3 && (1..=3).contains(&leading.len()) && !leading.starts_with('0')
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_both_separators_last_one_is_decimal() {
        assert_eq!(parse_number("1.234.567,00"), Some(dec!(1234567.00)));
        assert_eq!(parse_number("1,234,567.00"), Some(dec!(1234567.00)));
        assert_eq!(parse_number("1,5.25"), Some(dec!(15.25)));
    }

    #[test]
    fn test_single_kind_repeated_is_grouping() {
        assert_eq!(parse_number("1.234.567"), Some(dec!(1234567)));
        assert_eq!(parse_number("10,000,000"), Some(dec!(10000000)));
    }

    #[test]
    fn test_single_separator() {
        assert_eq!(parse_number("1.500"), Some(dec!(1500)));
        assert_eq!(parse_number("250,000"), Some(dec!(250000)));
        assert_eq!(parse_number("1,5"), Some(dec!(1.5)));
        assert_eq!(parse_number("1234.56"), Some(dec!(1234.56)));
        assert_eq!(parse_number("0.125"), Some(dec!(0.125)));
        assert_eq!(parse_number(",75"), Some(dec!(0.75)));
    }

    #[test]
    fn test_currency_prefix_and_spaces() {
        assert_eq!(parse_number("  Rp 1.000.000 "), Some(dec!(1000000)));
        assert_eq!(parse_number("Rp. 2.500,50"), Some(dec!(2500.50)));
        assert_eq!(parse_number("rp1 000 000"), Some(dec!(1000000)));
    }

    #[test]
    fn test_negative_forms() {
        assert_eq!(parse_number("-1.000"), Some(dec!(-1000)));
        assert_eq!(parse_number("(1.000,50)"), Some(dec!(-1000.50)));
        assert_eq!(parse_number("Rp -5"), Some(dec!(-5)));
    }

    #[test]
    fn test_rejects_garbage() {
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("Rp"), None);
        assert_eq!(parse_number("12a"), None);
        assert_eq!(parse_number("1,2,3.4.5"), None);
        assert_eq!(parse_number("..."), None);
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count("45"), Some(45));
        assert_eq!(parse_count("1.200"), Some(1200));
        assert_eq!(parse_count("-3"), None);
        assert_eq!(parse_count("2,5"), None);
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 15);
        assert_eq!(parse_date("15/03/2024"), expected);
        assert_eq!(parse_date("2024-03-15"), expected);
        assert_eq!(parse_date("15-03-2024"), expected);
        assert_eq!(parse_date(" 5/3/2024 "), NaiveDate::from_ymd_opt(2024, 3, 5));
    }

    #[test]
    fn test_parse_date_rejects_other_layouts() {
        assert_eq!(parse_date("03/15/2024"), None);
        assert_eq!(parse_date("15.03.2024"), None);
        assert_eq!(parse_date("15/03/24"), None);
        assert_eq!(parse_date("31/02/2024"), None);
    }
}
