//! PDF-to-table conversion.
//!
//! Unlike ingestion, conversion reads fields from the text *after* each
//! position number, which suits lists where every item sits on one line.
//! Several items may share a line. When the line pass finds few items the
//! whole text is scanned once more so items wrapped across lines are not
//! lost.

use std::collections::HashSet;
use std::path::Path;

use crate::error::DocSearchError;
use crate::extraction::{PageContent, PdfExtractor};
use crate::model::{non_blank, PriceRecord};
use crate::parsing::normalize::clean_description;
use crate::parsing::values::{find_position_numbers, find_price, find_unit, Token};
use crate::parsing::Origin;

/// Lines shorter than this (in characters) cannot hold an item.
const MIN_LINE_CHARS: usize = 5;
/// Below this many items the whole-text pass runs too.
pub const SPARSE_RESULT: usize = 98;
/// Cap on the text read after a position number in the whole-text pass.
pub const MAX_SEGMENT_CHARS: usize = 2000;

/// Convert a PDF file. Unlike ingestion, extraction errors are returned.
pub fn convert_file(
    path: &Path,
    extractor: &dyn PdfExtractor,
) -> Result<Vec<PriceRecord>, DocSearchError> {
    if !path.is_file() {
        return Err(DocSearchError::FileNotFound(path.to_path_buf()));
    }
    let bytes = std::fs::read(path)?;
    let pages = extractor.extract_pages(&bytes)?;
    let records = convert_pages(&pages, &Origin::from_path(path));
    tracing::info!(path = %path.display(), records = records.len(), "converted PDF");
    Ok(records)
}

/// Turn page texts into records, one per (position number, page).
pub fn convert_pages(pages: &[PageContent], origin: &Origin) -> Vec<PriceRecord> {
    let mut records = Vec::new();
    let mut seen: HashSet<(String, u32)> = HashSet::new();

    for page in pages {
        for line in page.text.lines() {
            let line = line.trim();
            if line.chars().count() < MIN_LINE_CHARS {
                continue;
            }
            for (position, segment) in segments(line) {
                let key = (position.to_string(), page.page_number);
                if seen.contains(&key) {
                    continue;
                }
                seen.insert(key);
                records.push(segment_record(position, segment, origin.record(page.page_number)));
            }
        }
    }

    if records.len() < SPARSE_RESULT {
        let before = records.len();
        records.extend(whole_text_pass(pages, &records, origin));
        tracing::debug!(
            line_pass = before,
            added = records.len() - before,
            "ran whole-text conversion pass"
        );
    }

    records
}

/// Scan the concatenated text for items the line pass did not produce.
fn whole_text_pass(
    pages: &[PageContent],
    found: &[PriceRecord],
    origin: &Origin,
) -> Vec<PriceRecord> {
    let mut text = String::new();
    let mut page_starts = Vec::with_capacity(pages.len());
    for page in pages {
        page_starts.push((text.len(), page.page_number));
        text.push_str(&page.text);
        text.push('\n');
    }
    let page_at = |offset: usize| {
        page_starts
            .iter()
            .rev()
            .find(|(start, _)| *start <= offset)
            .map(|(_, page)| *page)
            .unwrap_or(0)
    };

    let mut seen: HashSet<&str> = found
        .iter()
        .filter_map(|r| r.position_number.as_deref())
        .collect();

    let mut records = Vec::new();
    let positions: Vec<Token<'_>> = find_position_numbers(&text).collect();
    for (i, position) in positions.iter().enumerate() {
        if !seen.insert(position.text) {
            continue;
        }
        let end = positions
            .get(i + 1)
            .map(|next| next.span.start)
            .unwrap_or(text.len());
        if end <= position.span.end {
            continue;
        }
        let segment = take_chars(&text[position.span.end..end], MAX_SEGMENT_CHARS).trim();
        records.push(segment_record(
            position.text,
            segment,
            origin.record(page_at(position.span.start)),
        ));
    }
    records
}

/// Each position number in `line` with the text up to the next one.
fn segments(line: &str) -> Vec<(&str, &str)> {
    let positions: Vec<Token<'_>> = find_position_numbers(line).collect();
    positions
        .iter()
        .enumerate()
        .filter_map(|(i, position)| {
            let end = positions
                .get(i + 1)
                .map(|next| next.span.start)
                .unwrap_or(line.len());
            (end > position.span.end).then(|| (position.text, line[position.span.end..end].trim()))
        })
        .collect()
}

/// Fill `record` from the text following `position`.
///
/// Unit and price are the first of each in the segment; the description is
/// everything before whichever of them comes first.
fn segment_record(position: &str, segment: &str, record: PriceRecord) -> PriceRecord {
    let unit = find_unit(segment);
    let price = find_price(segment);

    let description_end = [unit.as_ref(), price.as_ref()]
        .into_iter()
        .flatten()
        .map(|t| t.span.start)
        .min()
        .unwrap_or(segment.len());
    let description_source = if description_end > 0 {
        &segment[..description_end]
    } else {
        segment
    };

    PriceRecord {
        position_number: Some(position.to_string()),
        description: non_blank(&clean_description(description_source, Some(position))),
        unit: unit.and_then(|t| non_blank(t.text)),
        price: price.and_then(|t| non_blank(t.text)),
        ..record
    }
}

fn take_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((cut, _)) => &s[..cut],
        None => s,
    }
}
