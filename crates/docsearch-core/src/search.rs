//! Free-text search over extracted documents.
//!
//! Matching is substring-based on Turkish-folded, lower-cased text, with a
//! plain case-insensitive comparison as a second chance. Paginated documents
//! report the page of every match; everything else reports page 0.

use std::collections::HashSet;

use crate::extraction::{PAGE_MARKER_PREFIX, PAGE_MARKER_SUFFIX};
use crate::model::{Document, SearchResult};
use crate::parsing::normalize::fold_for_match;

/// One page of a paginated document's raw text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText<'a> {
    pub page: u32,
    pub text: &'a str,
}

/// Does `raw_text` carry page-boundary markers?
pub fn is_paginated(raw_text: &str) -> bool {
    raw_text.contains(PAGE_MARKER_PREFIX)
}

/// Split marker-delimited text into pages.
///
/// Segments without a readable page number are numbered by their position.
pub fn split_pages(raw_text: &str) -> Vec<PageText<'_>> {
    raw_text
        .split(PAGE_MARKER_PREFIX)
        .filter(|segment| !segment.is_empty())
        .enumerate()
        .map(|(index, segment)| {
            let fallback = index as u32 + 1;
            match segment.split_once(PAGE_MARKER_SUFFIX) {
                Some((number, rest)) if is_page_number(number) => PageText {
                    page: number.parse().unwrap_or(fallback),
                    text: rest,
                },
                _ => PageText {
                    page: fallback,
                    text: segment,
                },
            }
        })
        .collect()
}

fn is_page_number(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Find where `query` occurs in `documents`.
///
/// Results are unique per (path, page) and sorted by document name, then page.
pub fn search(query: &str, documents: &[Document]) -> Vec<SearchResult> {
    if query.trim().is_empty() || documents.is_empty() {
        return Vec::new();
    }

    let matcher = Matcher::new(query);
    let mut results = Vec::new();

    for doc in documents {
        let hit = |page| SearchResult {
            document_path: doc.path.clone(),
            document_name: doc.name.clone(),
            page,
        };

        if matcher.matches_folded(&doc.name) {
            results.push(hit(0));
        }

        if is_paginated(&doc.raw_text) {
            for page in split_pages(&doc.raw_text) {
                if matcher.matches(page.text) {
                    results.push(hit(page.page));
                }
            }
        } else if matcher.matches(&doc.raw_text) {
            results.push(hit(0));
        }
    }

    dedupe_and_sort(results)
}

struct Matcher {
    folded: String,
    raw_lower: String,
}

impl Matcher {
    fn new(query: &str) -> Self {
        let query = query.trim();
        Matcher {
            folded: fold_for_match(query),
            raw_lower: query.to_lowercase(),
        }
    }

    fn matches_folded(&self, text: &str) -> bool {
        fold_for_match(text).contains(&self.folded)
    }

    fn matches(&self, text: &str) -> bool {
        self.matches_folded(text) || text.to_lowercase().contains(&self.raw_lower)
    }
}

fn dedupe_and_sort(results: Vec<SearchResult>) -> Vec<SearchResult> {
    let mut seen = HashSet::new();
    let mut unique: Vec<SearchResult> = results
        .into_iter()
        .filter(|r| seen.insert((r.document_path.clone(), r.page)))
        .collect();
    unique.sort_by(|a, b| {
        a.document_name
            .cmp(&b.document_name)
            .then(a.page.cmp(&b.page))
    });
    unique
}
