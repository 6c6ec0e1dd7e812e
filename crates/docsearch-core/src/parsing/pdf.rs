use crate::model::{non_blank, PriceRecord, ReconstructedLine};

use super::normalize::clean_description;
use super::values::{find_position_number, unit_and_price};
use super::Origin;

/// Turn reconstructed PDF lines into price records.
///
/// Price lists put the description above the line carrying the position
/// number, so every line without a position number is buffered and becomes
/// the description of the next position line. Lines buffered after the last
/// position line are dropped.
pub fn parse_lines(lines: &[ReconstructedLine], origin: &Origin) -> Vec<PriceRecord> {
    let mut records = Vec::new();
    let mut description: Vec<&str> = Vec::new();

    for line in lines {
        let Some(position) = find_position_number(&line.text) else {
            let trimmed = line.text.trim();
            if !trimmed.is_empty() {
                description.push(trimmed);
            }
            continue;
        };

        let remainder = line.text[position.span.end..].trim();
        let (unit, price) = unit_and_price(remainder);

        let joined = description.join(" ");
        let cleaned = clean_description(&joined, Some(position.text));

        records.push(PriceRecord {
            position_number: Some(position.text.to_string()),
            description: non_blank(&cleaned),
            unit: unit.and_then(non_blank),
            price: price.and_then(non_blank),
            ..origin.record(line.page)
        });

        description.clear();
    }

    records
}
