use regex::Regex;
use std::sync::LazyLock;

use super::values::find_position_numbers;

/// Descriptions longer than this many characters are cut and marked.
pub const MAX_DESCRIPTION_CHARS: usize = 500;
const TRUNCATION_MARKER: &str = "...";

/// Unit vocabulary. Multi-word units come first so "1000 Ad" wins over "Ad".
const UNIT_ALTERNATIVES: &str = r"1000\s+Ad\b|100\s+m²|Ton\b|m³|m²|Ad\b";

pub(crate) static UNIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"(?i)\b(?:{UNIT_ALTERNATIVES})")).unwrap());

static NUMBER_WITH_UNIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"(?i)(\d+)\s+(?:{UNIT_ALTERNATIVES})")).unwrap());

pub(crate) static PRICE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{1,3}[.,]\d{2}\b").unwrap());

static BOILERPLATE: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![Regex::new(r"(?i)t[üu][iİı]k\s+endeksleriyle\s+g[üu]ncel\s+fiyatlar").unwrap()]
});

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Clean a free-text description taken from a price list.
///
/// Steps:
/// 1. Remove the record's own position number, if given
/// 2. Remove price-like tokens ("254,78")
/// 3. Collapse "<number> <unit>" to "<number>" ("1 Ton" -> "1")
/// 4. Remove remaining unit tokens
/// 5. Remove known boilerplate phrases
/// 6. Collapse whitespace, cap the length
pub fn clean_description(raw: &str, position_number: Option<&str>) -> String {
    if raw.trim().is_empty() {
        return String::new();
    }

    let mut s = raw.to_string();
    if let Some(pos) = position_number.filter(|p| !p.is_empty()) {
        s = remove_position_number(&s, pos);
    }

    s = PRICE.replace_all(&s, " ").into_owned();
    s = NUMBER_WITH_UNIT.replace_all(&s, "${1}").into_owned();
    s = UNIT.replace_all(&s, " ").into_owned();
    for phrase in BOILERPLATE.iter() {
        s = phrase.replace_all(&s, " ").into_owned();
    }
    s = WHITESPACE.replace_all(&s, " ").trim().to_string();

    truncate_chars(s, MAX_DESCRIPTION_CHARS)
}

/// Remove standalone occurrences of `pos`; longer digit runs are kept.
fn remove_position_number(text: &str, pos: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for token in find_position_numbers(text).filter(|t| t.text == pos) {
        out.push_str(&text[last..token.span.start]);
        last = token.span.end;
    }
    out.push_str(&text[last..]);
    out
}

fn truncate_chars(s: String, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((cut, _)) => {
            let mut out = s[..cut].to_string();
            out.push_str(TRUNCATION_MARKER);
            out
        }
        None => s,
    }
}

/// Map Turkish letters with diacritics to their base Latin letter.
///
/// Dotted capital İ and dotless ı both become "i"; upper-case letters fold
/// to lower-case base letters. Other characters are left alone.
pub fn fold_turkish(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            'ı' | 'İ' => 'i',
            'ş' | 'Ş' => 's',
            'ğ' | 'Ğ' => 'g',
            'ü' | 'Ü' => 'u',
            'ö' | 'Ö' => 'o',
            'ç' | 'Ç' => 'c',
            other => other,
        })
        .collect()
}

/// Folding key used for matching: diacritics removed, then lower-cased.
///
/// Folding must happen first: `'İ'.to_lowercase()` is "i̇" (two chars).
pub fn fold_for_match(text: &str) -> String {
    fold_turkish(text).to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_quantity_drops_unit() {
        assert_eq!(clean_description("Concrete pour, 1 Ton", None), "Concrete pour, 1");
    }

    #[test]
    fn removes_prices() {
        assert_eq!(
            clean_description("Excavation 254,78 by hand 12.50", None),
            "Excavation by hand"
        );
    }

    #[test]
    fn removes_free_standing_units() {
        assert_eq!(clean_description("Beton m³ dökülmesi Ad", None), "Beton dökülmesi");
    }

    #[test]
    fn compound_units() {
        assert_eq!(clean_description("Tuğla 1000 Ad", None), "Tuğla 1000");
        assert_eq!(clean_description("Sıva 100 m² yapılması", None), "Sıva 100 yapılması");
    }

    #[test]
    fn unit_match_is_case_insensitive() {
        assert_eq!(clean_description("Demir 5 ton", None), "Demir 5");
        assert_eq!(clean_description("Demir TON", None), "Demir");
    }

    #[test]
    fn unit_inside_word_is_kept() {
        assert_eq!(clean_description("Tonoz kalıbı Adana", None), "Tonoz kalıbı Adana");
    }

    #[test]
    fn strips_boilerplate_both_spellings() {
        assert_eq!(
            clean_description("Kazı işi TÜİK Endeksleriyle Güncel Fiyatlar", None),
            "Kazı işi"
        );
        assert_eq!(
            clean_description("tuik endeksleriyle guncel fiyatlar Kazı", None),
            "Kazı"
        );
    }

    #[test]
    fn removes_own_position_number() {
        assert_eq!(
            clean_description("15.100.1001 Kazı yapılması", Some("15.100.1001")),
            "Kazı yapılması"
        );
    }

    #[test]
    fn keeps_longer_numbers_containing_position() {
        assert_eq!(
            clean_description("Kod 15.100.10011", Some("15.100.1001")),
            "Kod 15.100.10011"
        );
    }

    #[test]
    fn collapses_whitespace() {
        assert_eq!(clean_description("  a \t\n b  ", None), "a b");
    }

    #[test]
    fn blank_stays_blank() {
        assert_eq!(clean_description("   ", None), "");
    }

    #[test]
    fn truncates_long_descriptions() {
        let long = "ş".repeat(MAX_DESCRIPTION_CHARS + 20);
        let cleaned = clean_description(&long, None);
        assert_eq!(cleaned.chars().count(), MAX_DESCRIPTION_CHARS + 3);
        assert!(cleaned.ends_with("..."));
    }

    #[test]
    fn exact_limit_is_not_truncated() {
        let text = "a".repeat(MAX_DESCRIPTION_CHARS);
        assert_eq!(clean_description(&text, None), text);
    }

    #[test]
    fn fold_turkish_letters() {
        assert_eq!(fold_turkish("ıİşŞğĞüÜöÖçÇ"), "iissgguuoocc");
        assert_eq!(fold_turkish("abc"), "abc");
    }

    #[test]
    fn fold_for_match_dotted_capital() {
        assert_eq!(fold_for_match("İSTANBUL"), "istanbul");
        assert_eq!(fold_for_match("Öğrenci"), "ogrenci");
    }
}
