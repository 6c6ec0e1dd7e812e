use chrono::{DateTime, Local};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One catalog line item recovered from a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub position_number: Option<String>,
    pub description: Option<String>,
    pub unit: Option<String>,
    pub price: Option<String>,
    pub document_path: String,
    pub document_name: String,
    /// 1-based page, or 0 when the format has no pagination.
    pub page: u32,
}

impl PriceRecord {
    /// A record is only worth keeping when it names an item.
    pub fn is_meaningful(&self) -> bool {
        has_text(&self.position_number) || has_text(&self.description)
    }

    /// Numeric value of the free-text price.
    ///
    /// Accepts "254,78", "254.78", "1.254,78" and "1,254.78": the rightmost
    /// separator is the decimal separator, the other one groups thousands.
    pub fn price_value(&self) -> Option<Decimal> {
        let raw = self.price.as_deref()?.trim();
        if raw.is_empty() {
            return None;
        }
        let normalized = match (raw.rfind(','), raw.rfind('.')) {
            (Some(c), Some(d)) if c > d => raw.replace('.', "").replace(',', "."),
            (Some(_), Some(_)) => raw.replace(',', ""),
            (Some(_), None) => raw.replace(',', "."),
            _ => raw.to_string(),
        };
        Decimal::from_str(&normalized).ok()
    }
}

/// Returns the trimmed text if it is non-blank.
pub(crate) fn non_blank(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn has_text(field: &Option<String>) -> bool {
    field.as_deref().is_some_and(|s| !s.trim().is_empty())
}

/// A document held by the store.
///
/// Raw text and records are recomputed on every ingestion; only the
/// [`DocumentInfo`] part is ever written to disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub path: String,
    pub name: String,
    /// Lower-case extension including the leading dot, e.g. ".pdf".
    pub extension: String,
    pub size: u64,
    pub ingested_at: DateTime<Local>,
    pub raw_text: String,
    pub records: Vec<PriceRecord>,
}

impl Document {
    pub fn info(&self) -> DocumentInfo {
        DocumentInfo {
            path: self.path.clone(),
            name: self.name.clone(),
            extension: self.extension.clone(),
            size: self.size,
            timestamp: self.ingested_at,
        }
    }

    /// Path identity is case-insensitive.
    pub fn has_path(&self, path: &str) -> bool {
        same_path(&self.path, path)
    }
}

pub(crate) fn same_path(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

/// Metadata-only view of a [`Document`], the unit of persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentInfo {
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub extension: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default = "Local::now")]
    pub timestamp: DateTime<Local>,
}

/// One match location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub document_path: String,
    pub document_name: String,
    /// 0 for file-name matches and non-paginated content.
    pub page: u32,
}

/// A line of text rebuilt from positioned words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconstructedLine {
    pub page: u32,
    pub text: String,
}

impl ReconstructedLine {
    pub fn new(page: u32, text: impl Into<String>) -> Self {
        ReconstructedLine {
            page,
            text: text.into(),
        }
    }
}

/// Input formats, keyed by normalised file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    Pdf,
    Spreadsheet,
    Word,
}

impl FileFormat {
    /// Case-insensitive lookup; accepts the extension with or without a dot.
    pub fn from_extension(ext: &str) -> Option<FileFormat> {
        match ext.trim_start_matches('.').to_lowercase().as_str() {
            "pdf" => Some(FileFormat::Pdf),
            "xlsx" | "xls" => Some(FileFormat::Spreadsheet),
            "docx" | "doc" => Some(FileFormat::Word),
            _ => None,
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileFormat::Pdf => write!(f, "PDF"),
            FileFormat::Spreadsheet => write!(f, "Spreadsheet"),
            FileFormat::Word => write!(f, "Word"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn priced(price: &str) -> PriceRecord {
        PriceRecord {
            price: Some(price.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn price_value_decimal_comma() {
        assert_eq!(priced("254,78").price_value(), Some(dec!(254.78)));
    }

    #[test]
    fn price_value_decimal_point() {
        assert_eq!(priced("300.00").price_value(), Some(dec!(300.00)));
    }

    #[test]
    fn price_value_grouped_thousands() {
        assert_eq!(priced("1.254,78").price_value(), Some(dec!(1254.78)));
        assert_eq!(priced("1,254.78").price_value(), Some(dec!(1254.78)));
    }

    #[test]
    fn price_value_rejects_text() {
        assert_eq!(priced("n/a").price_value(), None);
        assert_eq!(priced("  ").price_value(), None);
        assert_eq!(PriceRecord::default().price_value(), None);
    }

    #[test]
    fn meaningful_requires_position_or_description() {
        let mut r = PriceRecord {
            unit: Some("Ton".into()),
            ..Default::default()
        };
        assert!(!r.is_meaningful());
        r.description = Some("   ".into());
        assert!(!r.is_meaningful());
        r.position_number = Some("15.100.1001".into());
        assert!(r.is_meaningful());
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(FileFormat::from_extension(".PDF"), Some(FileFormat::Pdf));
        assert_eq!(FileFormat::from_extension("xls"), Some(FileFormat::Spreadsheet));
        assert_eq!(FileFormat::from_extension(".Docx"), Some(FileFormat::Word));
        assert_eq!(FileFormat::from_extension(".txt"), None);
    }

    #[test]
    fn path_identity_ignores_case() {
        assert!(same_path("C:/Data/List.pdf", "c:/data/list.PDF"));
        assert!(!same_path("/a/list.pdf", "/b/list.pdf"));
    }
}
