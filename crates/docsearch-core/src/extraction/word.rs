use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::DocSearchError;
use crate::extraction::pdf::pages_to_text;
use crate::extraction::{Extracted, FormatParser, PageContent, PdfExtractor};
use crate::model::{FileFormat, PriceRecord};
use crate::parsing::word::{parse_tables, placeholder_record, Table};
use crate::parsing::Origin;

/// Converts a word-processor document to PDF so pages can be recovered.
pub trait DocumentRenderer: Send + Sync {
    fn render_pdf(&self, path: &Path) -> Result<Vec<u8>, DocSearchError>;

    fn renderer_name(&self) -> &str;
}

/// Renders through a headless LibreOffice/OpenOffice install.
pub struct OfficeRenderer {
    program: PathBuf,
}

impl OfficeRenderer {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        OfficeRenderer {
            program: program.into(),
        }
    }
}

impl DocumentRenderer for OfficeRenderer {
    fn render_pdf(&self, path: &Path) -> Result<Vec<u8>, DocSearchError> {
        let out_dir = tempfile::tempdir()?;
        let output = Command::new(&self.program)
            .arg("--headless")
            .arg("--convert-to")
            .arg("pdf")
            .arg("--outdir")
            .arg(out_dir.path())
            .arg(path)
            .output()
            .map_err(|e| {
                DocSearchError::Word(format!("cannot run {}: {e}", self.program.display()))
            })?;

        if !output.status.success() {
            return Err(DocSearchError::Word(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status.code().unwrap_or(-1),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let stem = path
            .file_stem()
            .ok_or_else(|| DocSearchError::Word(format!("no file name: {}", path.display())))?;
        let mut pdf_name = stem.to_os_string();
        pdf_name.push(".pdf");
        std::fs::read(out_dir.path().join(pdf_name))
            .map_err(|e| DocSearchError::Word(format!("rendered PDF missing: {e}")))
    }

    fn renderer_name(&self) -> &str {
        "office"
    }
}

/// Body of a `.docx`: paragraph text and top-level tables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WordBody {
    /// Paragraphs separated by newlines, table paragraphs included.
    pub text: String,
    pub tables: Vec<Table>,
}

/// Read `word/document.xml` out of a `.docx` archive.
pub fn read_body(path: &Path) -> Result<WordBody, DocSearchError> {
    let file = File::open(path)?;
    let mut archive = zip::ZipArchive::new(BufReader::new(file))
        .map_err(|e| DocSearchError::Word(e.to_string()))?;
    let xml = read_document_xml(&mut archive)?;
    parse_document_xml(&xml)
}

fn read_document_xml<R: Read + Seek>(
    archive: &mut zip::ZipArchive<R>,
) -> Result<String, DocSearchError> {
    let mut entry = archive
        .by_name("word/document.xml")
        .map_err(|e| DocSearchError::Word(format!("cannot find word/document.xml: {e}")))?;
    let mut xml = String::new();
    entry
        .read_to_string(&mut xml)
        .map_err(|e| DocSearchError::Word(e.to_string()))?;
    Ok(xml)
}

/// Walk the WordprocessingML body.
///
/// Cell text is the concatenation of every `w:t` inside the cell, nested
/// tables included. Only tables directly in the body are returned.
fn parse_document_xml(xml: &str) -> Result<WordBody, DocSearchError> {
    let mut reader = Reader::from_str(xml);

    let mut paragraphs: Vec<String> = Vec::new();
    let mut paragraph = String::new();
    let mut in_text = false;

    let mut tables: Vec<Table> = Vec::new();
    let mut table_depth = 0usize;
    let mut table: Table = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut cell = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"w:t" => in_text = true,
                b"w:tbl" => {
                    if table_depth == 0 {
                        table.clear();
                    }
                    table_depth += 1;
                }
                b"w:tr" if table_depth == 1 => row.clear(),
                b"w:tc" if table_depth == 1 => cell.clear(),
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"w:tab" => paragraph.push('\t'),
                b"w:br" | b"w:cr" => paragraph.push('\n'),
                b"w:tc" if table_depth == 1 => row.push(String::new()),
                _ => {}
            },
            Ok(Event::Text(t)) if in_text => {
                let text = t.unescape().map_err(|e| DocSearchError::Word(e.to_string()))?;
                paragraph.push_str(&text);
                if table_depth > 0 {
                    cell.push_str(&text);
                }
            }
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:p" => {
                    let text = paragraph.trim();
                    if !text.is_empty() {
                        paragraphs.push(text.to_string());
                    }
                    paragraph.clear();
                }
                b"w:tc" if table_depth == 1 => row.push(cell.trim().to_string()),
                b"w:tr" if table_depth == 1 => table.push(std::mem::take(&mut row)),
                b"w:tbl" => {
                    table_depth = table_depth.saturating_sub(1);
                    if table_depth == 0 {
                        tables.push(std::mem::take(&mut table));
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(DocSearchError::Word(format!(
                    "bad document.xml at {}: {e}",
                    reader.buffer_position()
                )))
            }
            _ => {}
        }
    }

    Ok(WordBody {
        text: paragraphs.join("\n"),
        tables,
    })
}

/// `.docx` / `.doc`.
///
/// Text comes from the rendered PDF when a renderer is configured and
/// works, with page markers; otherwise from the body paragraphs. Records
/// come from body tables. Nothing here returns an error.
pub struct WordParser {
    renderer: Option<Arc<dyn DocumentRenderer>>,
    extractor: Arc<dyn PdfExtractor>,
}

impl WordParser {
    pub fn new(
        renderer: Option<Arc<dyn DocumentRenderer>>,
        extractor: Arc<dyn PdfExtractor>,
    ) -> Self {
        WordParser {
            renderer,
            extractor,
        }
    }

    fn rendered_pages(&self, path: &Path) -> Option<Vec<PageContent>> {
        let renderer = self.renderer.as_ref()?;
        let result = renderer
            .render_pdf(path)
            .and_then(|pdf| self.extractor.extract_pages(&pdf));
        match result {
            Ok(pages) if pages.iter().any(|p| !p.text.trim().is_empty()) => Some(pages),
            Ok(_) => None,
            Err(e) => {
                tracing::debug!(
                    path = %path.display(),
                    renderer = renderer.renderer_name(),
                    error = %e,
                    "rendering failed, using body text"
                );
                None
            }
        }
    }

    fn body(&self, path: &Path) -> Option<WordBody> {
        match read_body(path) {
            Ok(body) => Some(body),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cannot read Word body");
                None
            }
        }
    }
}

impl FormatParser for WordParser {
    fn format(&self) -> FileFormat {
        FileFormat::Word
    }

    fn extract_text(&self, path: &Path) -> Result<String, DocSearchError> {
        Ok(self.extract(path)?.text)
    }

    fn extract_records(&self, path: &Path) -> Result<Vec<PriceRecord>, DocSearchError> {
        let origin = Origin::from_path(path);
        Ok(self
            .body(path)
            .map(|body| parse_tables(&body.tables, &body.text, &origin))
            .unwrap_or_default())
    }

    fn extract(&self, path: &Path) -> Result<Extracted, DocSearchError> {
        let origin = Origin::from_path(path);
        let body = self.body(path);
        let rendered = self.rendered_pages(path);

        let text = match (&rendered, &body) {
            (Some(pages), _) => pages_to_text(pages),
            (None, Some(body)) => body.text.clone(),
            (None, None) => String::new(),
        };

        let records = match &body {
            Some(body) => parse_tables(&body.tables, &body.text, &origin),
            // Unreadable body (e.g. legacy .doc): the rendered text still
            // makes a placeholder.
            None => rendered
                .as_deref()
                .map(plain_text)
                .and_then(|t| placeholder_record(&t, &origin))
                .into_iter()
                .collect(),
        };

        Ok(Extracted { text, records })
    }
}

fn plain_text(pages: &[PageContent]) -> String {
    pages
        .iter()
        .map(|p| p.text.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
