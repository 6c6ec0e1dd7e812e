use crate::model::{non_blank, PriceRecord};

use super::header::{detect_header, ColumnMap};
use super::normalize::clean_description;
use super::values::clean_position_number;
use super::Origin;

/// Parse the used rows of one sheet into price records.
///
/// `rows` starts at the first used row and every row starts at the first
/// used column. If no header row is found, the first row is still treated
/// as the header and the first four columns are used positionally.
pub fn parse_sheet(rows: &[Vec<String>], origin: &Origin) -> Vec<PriceRecord> {
    if rows.iter().all(|row| row.iter().all(|c| c.trim().is_empty())) {
        return Vec::new();
    }

    let (header_row, map) = detect_header(rows).unwrap_or((0, ColumnMap::default()));
    let cols = map.resolve();

    let mut records = Vec::new();
    for row in rows.iter().skip(header_row + 1) {
        let cell = |i: usize| row.get(i).map(|s| s.trim()).unwrap_or("");
        let position_raw = cell(cols.position_number);
        let description_raw = cell(cols.description);
        let unit_raw = cell(cols.unit);
        let price_raw = cell(cols.price);

        if [position_raw, description_raw, unit_raw, price_raw]
            .iter()
            .all(|s| s.is_empty())
        {
            continue;
        }

        let record = PriceRecord {
            position_number: clean_position_number(position_raw),
            description: non_blank(&clean_description(description_raw, None)),
            unit: non_blank(unit_raw),
            price: non_blank(price_raw),
            ..origin.record(0)
        };
        if record.is_meaningful() {
            records.push(record);
        }
    }

    records
}
