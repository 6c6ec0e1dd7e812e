use crate::model::{non_blank, PriceRecord};

use super::header::classify_row;
use super::Origin;

/// Rows of cells; each cell is the concatenated text of its runs.
pub type Table = Vec<Vec<String>>;

/// Parse Word tables into price records.
///
/// Row 0 of every table is the header. Cell text is kept as written (only
/// trimmed), unlike PDF and spreadsheet descriptions. When no table yields a
/// record, the whole body text becomes a single placeholder record so the
/// document still shows up as one item.
pub fn parse_tables(tables: &[Table], body_text: &str, origin: &Origin) -> Vec<PriceRecord> {
    let mut records = Vec::new();

    for table in tables.iter().filter(|t| t.len() >= 2) {
        let cols = classify_row(&table[0]).resolve();

        for row in &table[1..] {
            if row.is_empty() {
                continue;
            }
            let cell = |i: usize| row.get(i).map(|s| s.as_str()).unwrap_or("");
            let record = PriceRecord {
                position_number: non_blank(cell(cols.position_number)),
                description: non_blank(cell(cols.description)),
                unit: non_blank(cell(cols.unit)),
                price: non_blank(cell(cols.price)),
                ..origin.record(0)
            };
            if record.is_meaningful() {
                records.push(record);
            }
        }
    }

    if records.is_empty() {
        if let Some(placeholder) = placeholder_record(body_text, origin) {
            records.push(placeholder);
        }
    }

    records
}

/// A record carrying the whole document text as its description.
pub fn placeholder_record(body_text: &str, origin: &Origin) -> Option<PriceRecord> {
    non_blank(body_text).map(|text| PriceRecord {
        description: Some(text),
        ..origin.record(0)
    })
}
