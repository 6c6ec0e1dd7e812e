use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

use super::normalize::{PRICE, UNIT};

/// Position number inside a longer text: 2.3.4 digits, not followed by a digit.
///
/// The regex crate has no look-ahead, so the trailing non-digit is consumed
/// and the number itself is capture group 1.
static POSITION_IN_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{2}\.\d{3}\.\d{4})(?:\D|$)").unwrap());

/// A cell holding nothing but a position number.
static POSITION_STRICT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d{2}\.\d{3}\.\d{4})\s*$").unwrap());

/// Any embedded position-number shape, digits after it allowed.
static POSITION_LOOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{2}\.\d{3}\.\d{4}").unwrap());

/// A token located inside a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub text: &'a str,
    pub span: Range<usize>,
}

/// First position number in `text`.
pub fn find_position_number(text: &str) -> Option<Token<'_>> {
    find_position_numbers(text).next()
}

/// All position numbers in `text`, left to right.
pub fn find_position_numbers(text: &str) -> impl Iterator<Item = Token<'_>> {
    POSITION_IN_TEXT.captures_iter(text).filter_map(|caps| {
        let m = caps.get(1)?;
        Some(Token {
            text: m.as_str(),
            span: m.range(),
        })
    })
}

/// First unit token in `text` ("Ton", "m²", "1000 Ad", ...).
pub fn find_unit(text: &str) -> Option<Token<'_>> {
    UNIT.find(text).map(|m| Token {
        text: m.as_str(),
        span: m.range(),
    })
}

/// First price token in `text` ("254,78", "12.50").
pub fn find_price(text: &str) -> Option<Token<'_>> {
    PRICE.find(text).map(|m| Token {
        text: m.as_str(),
        span: m.range(),
    })
}

/// Price that belongs to a row remainder: searched after the unit when a
/// unit is present, otherwise anywhere in the remainder.
pub fn unit_and_price(remainder: &str) -> (Option<&str>, Option<&str>) {
    match find_unit(remainder) {
        Some(unit) => {
            let after = &remainder[unit.span.end..];
            (Some(unit.text.trim()), find_price(after).map(|p| p.text))
        }
        None => (None, find_price(remainder).map(|p| p.text)),
    }
}

/// Normalise a position-number cell.
///
/// Tries the strict whole-cell shape, then an embedded shape, and finally
/// keeps the trimmed raw value. Blank cells give `None`.
pub fn clean_position_number(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Some(caps) = POSITION_STRICT.captures(trimmed) {
        return caps.get(1).map(|m| m.as_str().to_string());
    }
    if let Some(m) = POSITION_LOOSE.find(trimmed) {
        return Some(m.as_str().to_string());
    }
    Some(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_position_number_with_span() {
        let t = find_position_number("a 15.100.1001 b").unwrap();
        assert_eq!(t.text, "15.100.1001");
        assert_eq!(t.span, 2..13);
    }

    #[test]
    fn position_number_at_end_of_line() {
        assert_eq!(find_position_number("x 15.100.1001").unwrap().text, "15.100.1001");
    }

    #[test]
    fn position_followed_by_digit_is_rejected() {
        assert!(find_position_number("15.100.10011").is_none());
    }

    #[test]
    fn position_after_tab() {
        assert_eq!(
            find_position_number("Kazı\t15.100.2002\tTon").unwrap().text,
            "15.100.2002"
        );
    }

    #[test]
    fn finds_every_position_number() {
        let all: Vec<_> = find_position_numbers("15.100.1001 x 15.100.1002")
            .map(|t| t.text)
            .collect();
        assert_eq!(all, vec!["15.100.1001", "15.100.1002"]);
    }

    #[test]
    fn unit_then_price_after_unit() {
        let (unit, price) = unit_and_price(" Ton 300,00 continues");
        assert_eq!(unit, Some("Ton"));
        assert_eq!(price, Some("300,00"));
    }

    #[test]
    fn price_before_unit_is_ignored() {
        let (unit, price) = unit_and_price(" 12,50 m² ");
        assert_eq!(unit, Some("m²"));
        assert_eq!(price, None);
    }

    #[test]
    fn price_without_unit() {
        let (unit, price) = unit_and_price("Kazı 45.10");
        assert_eq!(unit, None);
        assert_eq!(price, Some("45.10"));
    }

    #[test]
    fn clean_position_strict() {
        assert_eq!(clean_position_number(" 15.100.1001 ").as_deref(), Some("15.100.1001"));
    }

    #[test]
    fn clean_position_embedded() {
        assert_eq!(
            clean_position_number("Poz: 15.100.1001-A").as_deref(),
            Some("15.100.1001")
        );
    }

    #[test]
    fn clean_position_raw_fallback() {
        assert_eq!(clean_position_number(" Y.16.050 ").as_deref(), Some("Y.16.050"));
        assert_eq!(clean_position_number("   "), None);
    }
}
