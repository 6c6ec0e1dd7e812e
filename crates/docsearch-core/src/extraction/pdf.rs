use std::path::Path;
use std::sync::Arc;

use crate::error::DocSearchError;
use crate::extraction::layout::LineLayout;
use crate::extraction::{join_pages, Extracted, FormatParser, PageContent, PdfExtractor};
use crate::model::{FileFormat, PriceRecord};
use crate::parsing::{pdf::parse_lines, Origin};

/// PDF format: page text with markers, records from reconstructed lines.
///
/// Unreadable files (or a missing backend) give empty output rather than
/// an error.
pub struct PdfParser {
    extractor: Arc<dyn PdfExtractor>,
    layout: LineLayout,
}

impl PdfParser {
    pub fn new(extractor: Arc<dyn PdfExtractor>, layout: LineLayout) -> Self {
        PdfParser { extractor, layout }
    }

    fn pages(&self, path: &Path) -> Vec<PageContent> {
        let result = std::fs::read(path)
            .map_err(DocSearchError::from)
            .and_then(|bytes| self.extractor.extract_pages(&bytes));
        match result {
            Ok(pages) => pages,
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    backend = self.extractor.backend_name(),
                    error = %e,
                    "PDF extraction failed, treating document as empty"
                );
                Vec::new()
            }
        }
    }

    fn records(&self, path: &Path, pages: &[PageContent]) -> Vec<PriceRecord> {
        let lines = self.layout.reconstruct(pages);
        parse_lines(&lines, &Origin::from_path(path))
    }
}

/// Full text of `pages`; pages without text are left out.
pub fn pages_to_text(pages: &[PageContent]) -> String {
    join_pages(
        pages
            .iter()
            .filter(|p| !p.text.trim().is_empty())
            .map(|p| (p.page_number, p.text.trim_end())),
    )
}

impl FormatParser for PdfParser {
    fn format(&self) -> FileFormat {
        FileFormat::Pdf
    }

    fn extract_text(&self, path: &Path) -> Result<String, DocSearchError> {
        Ok(pages_to_text(&self.pages(path)))
    }

    fn extract_records(&self, path: &Path) -> Result<Vec<PriceRecord>, DocSearchError> {
        let pages = self.pages(path);
        Ok(self.records(path, &pages))
    }

    fn extract(&self, path: &Path) -> Result<Extracted, DocSearchError> {
        let pages = self.pages(path);
        tracing::debug!(path = %path.display(), pages = pages.len(), "extracted PDF");
        Ok(Extracted {
            text: pages_to_text(&pages),
            records: self.records(path, &pages),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::WordBox;

    struct FixedPages(Vec<PageContent>);

    impl PdfExtractor for FixedPages {
        fn extract_pages(&self, _: &[u8]) -> Result<Vec<PageContent>, DocSearchError> {
            Ok(self.0.clone())
        }

        fn backend_name(&self) -> &str {
            "fixed"
        }
    }

    struct Broken;

    impl PdfExtractor for Broken {
        fn extract_pages(&self, _: &[u8]) -> Result<Vec<PageContent>, DocSearchError> {
            Err(DocSearchError::Extraction("not a PDF".into()))
        }

        fn backend_name(&self) -> &str {
            "broken"
        }
    }

    fn word(text: &str, left: f32, bottom: f32) -> WordBox {
        WordBox {
            text: text.into(),
            left,
            right: left + 5.0 * text.chars().count() as f32,
            bottom,
            top: bottom + 10.0,
        }
    }

    fn pdf_file() -> tempfile::NamedTempFile {
        let mut f = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        std::io::Write::write_all(&mut f, b"%PDF-1.4").unwrap();
        f
    }

    #[test]
    fn text_and_records_from_one_extraction() {
        let pages = vec![PageContent {
            page_number: 1,
            text: "Excavation work\n15.100.2002 Ton 300,00\n".into(),
            words: vec![
                word("Excavation", 10.0, 700.0),
                word("work", 65.0, 700.0),
                word("15.100.2002", 10.0, 680.0),
                word("Ton", 100.0, 680.0),
                word("300,00", 120.0, 680.0),
            ],
        }];
        let parser = PdfParser::new(Arc::new(FixedPages(pages)), LineLayout::default());
        let file = pdf_file();

        let extracted = parser.extract(file.path()).unwrap();
        assert!(extracted.text.starts_with("---PAGE_1---\nExcavation work"));
        assert_eq!(extracted.records.len(), 1);
        let r = &extracted.records[0];
        assert_eq!(r.position_number.as_deref(), Some("15.100.2002"));
        assert_eq!(r.description.as_deref(), Some("Excavation work"));
        assert_eq!(r.unit.as_deref(), Some("Ton"));
        assert_eq!(r.price.as_deref(), Some("300,00"));
        assert_eq!(r.page, 1);
    }

    #[test]
    fn blank_pages_are_left_out_of_text() {
        let pages = vec![
            PageContent {
                page_number: 1,
                text: " \n".into(),
                words: vec![],
            },
            PageContent {
                page_number: 2,
                text: "ikinci".into(),
                words: vec![],
            },
        ];
        assert_eq!(pages_to_text(&pages), "---PAGE_2---\nikinci\n");
    }

    #[test]
    fn extraction_failure_degrades_to_empty() {
        let parser = PdfParser::new(Arc::new(Broken), LineLayout::default());
        let file = pdf_file();
        let extracted = parser.extract(file.path()).unwrap();
        assert!(extracted.text.is_empty());
        assert!(extracted.records.is_empty());
    }
}
