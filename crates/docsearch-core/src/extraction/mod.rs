pub mod layout;
pub mod pdf;
pub mod pdftotext;
pub mod spreadsheet;
pub mod word;

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;

use crate::config::Config;
use crate::error::DocSearchError;
use crate::model::{FileFormat, PriceRecord};

use self::layout::LineLayout;
use self::pdf::PdfParser;
use self::pdftotext::PdftotextExtractor;
use self::spreadsheet::SpreadsheetParser;
use self::word::{DocumentRenderer, OfficeRenderer, WordParser};

/// Opening token of a page-boundary marker.
pub const PAGE_MARKER_PREFIX: &str = "---PAGE_";
/// Closing token of a page-boundary marker.
pub const PAGE_MARKER_SUFFIX: &str = "---";

/// A positioned word, in PDF user space (origin bottom-left).
#[derive(Debug, Clone, PartialEq)]
pub struct WordBox {
    pub text: String,
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
}

/// Content extracted from a single page of a PDF.
#[derive(Debug, Clone, Default)]
pub struct PageContent {
    /// 1-based.
    pub page_number: u32,
    pub text: String,
    pub words: Vec<WordBox>,
}

/// Trait for PDF text extraction backends.
pub trait PdfExtractor: Send + Sync {
    /// Extract text and word boxes from PDF bytes, one PageContent per page.
    fn extract_pages(&self, pdf_bytes: &[u8]) -> Result<Vec<PageContent>, DocSearchError>;

    /// Name of this extraction backend (for diagnostics).
    fn backend_name(&self) -> &str;
}

/// Text and records pulled out of one file.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Extracted {
    pub text: String,
    pub records: Vec<PriceRecord>,
}

/// One implementation per input format.
pub trait FormatParser: Send + Sync {
    fn format(&self) -> FileFormat;

    /// Searchable text; paginated formats wrap every page in a marker.
    fn extract_text(&self, path: &Path) -> Result<String, DocSearchError>;

    fn extract_records(&self, path: &Path) -> Result<Vec<PriceRecord>, DocSearchError>;

    /// Both at once. Parsers that can share work between the two override this.
    fn extract(&self, path: &Path) -> Result<Extracted, DocSearchError> {
        Ok(Extracted {
            text: self.extract_text(path)?,
            records: self.extract_records(path)?,
        })
    }
}

/// `---PAGE_<n>---`
pub fn page_marker(page_number: u32) -> String {
    format!("{PAGE_MARKER_PREFIX}{page_number}{PAGE_MARKER_SUFFIX}")
}

/// Wrap every page's text in its marker and concatenate.
pub fn join_pages<'a, I>(pages: I) -> String
where
    I: IntoIterator<Item = (u32, &'a str)>,
{
    let mut out = String::new();
    for (number, text) in pages {
        out.push_str(&page_marker(number));
        out.push('\n');
        out.push_str(text);
        out.push('\n');
    }
    out
}

/// Dispatch table from normalised extension to format parser.
pub struct FormatRegistry {
    parsers: HashMap<String, Arc<dyn FormatParser>>,
}

impl FormatRegistry {
    /// Registry with the external tools named in `config`.
    pub fn new(config: &Config) -> Self {
        let pdftotext = PdftotextExtractor::new(&config.pdf.pdftotext_path);
        if !pdftotext.is_available() {
            tracing::warn!(
                program = %config.pdf.pdftotext_path.display(),
                "pdftotext not found, PDF documents will have no text"
            );
        }
        let extractor: Arc<dyn PdfExtractor> = Arc::new(pdftotext);
        let renderer: Option<Arc<dyn DocumentRenderer>> = if config.word.render_pages {
            Some(Arc::new(OfficeRenderer::new(&config.word.office_path)))
        } else {
            None
        };
        Self::with_backends(extractor, renderer, LineLayout::from_config(&config.pdf))
    }

    /// Registry with explicit backends; used by tests to avoid external tools.
    pub fn with_backends(
        extractor: Arc<dyn PdfExtractor>,
        renderer: Option<Arc<dyn DocumentRenderer>>,
        layout: LineLayout,
    ) -> Self {
        let mut registry = FormatRegistry {
            parsers: HashMap::new(),
        };
        registry.register(&["pdf"], Arc::new(PdfParser::new(extractor.clone(), layout)));
        registry.register(&["xlsx", "xls"], Arc::new(SpreadsheetParser));
        registry.register(&["docx", "doc"], Arc::new(WordParser::new(renderer, extractor)));
        registry
    }

    /// Map `extensions` (without dot, any case) to `parser`, replacing earlier entries.
    pub fn register(&mut self, extensions: &[&str], parser: Arc<dyn FormatParser>) {
        for ext in extensions {
            self.parsers.insert(normalize_extension(ext), parser.clone());
        }
    }

    pub fn parser_for(&self, path: &Path) -> Option<&dyn FormatParser> {
        let ext = path.extension()?.to_string_lossy();
        self.parsers
            .get(&normalize_extension(&ext))
            .map(|p| p.as_ref())
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_lowercase()
}
