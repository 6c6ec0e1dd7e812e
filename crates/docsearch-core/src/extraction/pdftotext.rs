use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::DocSearchError;
use crate::extraction::{PageContent, PdfExtractor, WordBox};

/// PDF extraction backend using pdftotext (from poppler-utils).
///
/// Page text comes from `pdftotext -layout`, word boxes from
/// `pdftotext -bbox`.
pub struct PdftotextExtractor {
    program: PathBuf,
}

impl PdftotextExtractor {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        PdftotextExtractor {
            program: program.into(),
        }
    }

    /// Check if pdftotext is available on the system.
    pub fn is_available(&self) -> bool {
        Command::new(&self.program)
            .arg("-v")
            .output()
            .map(|o| o.status.success() || !o.stderr.is_empty())
            .unwrap_or(false)
    }

    fn run(&self, mode: &str, pdf_path: &Path) -> Result<Vec<u8>, DocSearchError> {
        let output = Command::new(&self.program)
            .arg(mode)
            .arg(pdf_path)
            .arg("-") // output to stdout
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    DocSearchError::PdftotextNotFound
                } else {
                    DocSearchError::Extraction(format!("pdftotext {mode} failed: {e}"))
                }
            })?;

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            return Err(DocSearchError::PdftotextFailed { code, stderr });
        }

        Ok(output.stdout)
    }
}

impl Default for PdftotextExtractor {
    fn default() -> Self {
        Self::new("pdftotext")
    }
}

impl PdfExtractor for PdftotextExtractor {
    fn extract_pages(&self, pdf_bytes: &[u8]) -> Result<Vec<PageContent>, DocSearchError> {
        let mut tmpfile = tempfile::NamedTempFile::new()
            .map_err(|e| DocSearchError::Extraction(e.to_string()))?;
        tmpfile
            .write_all(pdf_bytes)
            .map_err(|e| DocSearchError::Extraction(e.to_string()))?;
        let tmp_path = tmpfile.path().to_path_buf();

        let layout = self.run("-layout", &tmp_path)?;
        let text = String::from_utf8_lossy(&layout);
        let page_texts = split_pages(&text);

        let bbox = self.run("-bbox", &tmp_path)?;
        let page_words = parse_bbox_xhtml(&String::from_utf8_lossy(&bbox))?;

        Ok(merge_pages(page_texts, page_words))
    }

    fn backend_name(&self) -> &str {
        "pdftotext"
    }
}

/// pdftotext ends every page with a form feed.
fn split_pages(text: &str) -> Vec<String> {
    let mut pages: Vec<String> = text.split('\x0c').map(|p| p.to_string()).collect();
    if pages.last().is_some_and(|p| p.trim().is_empty()) {
        pages.pop();
    }
    pages
}

fn merge_pages(mut texts: Vec<String>, mut words: Vec<Vec<WordBox>>) -> Vec<PageContent> {
    let count = texts.len().max(words.len());
    texts.resize_with(count, String::new);
    words.resize_with(count, Vec::new);
    texts
        .into_iter()
        .zip(words)
        .enumerate()
        .map(|(i, (text, words))| PageContent {
            page_number: i as u32 + 1,
            text,
            words,
        })
        .collect()
}

/// Parse `pdftotext -bbox` XHTML into words per page.
///
/// pdftotext reports `yMin`/`yMax` from the top of the page; they are
/// flipped here so that `bottom` grows upwards like PDF user space.
fn parse_bbox_xhtml(xml: &str) -> Result<Vec<Vec<WordBox>>, DocSearchError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut pages: Vec<Vec<WordBox>> = Vec::new();
    let mut page_height = 0.0_f32;
    let mut pending: Option<[f32; 4]> = None;
    let mut word_text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"page" => {
                    page_height = attr_f32(&e, b"height").unwrap_or(0.0);
                    pages.push(Vec::new());
                }
                b"word" => {
                    pending = word_bounds(&e);
                    word_text.clear();
                }
                _ => {}
            },
            Ok(Event::Empty(e)) if e.local_name().as_ref() == b"page" => pages.push(Vec::new()),
            Ok(Event::Text(t)) if pending.is_some() => {
                let text = t
                    .unescape()
                    .map_err(|e| DocSearchError::Extraction(e.to_string()))?;
                word_text.push_str(&text);
            }
            Ok(Event::End(e)) if e.local_name().as_ref() == b"word" => {
                let text = word_text.trim();
                if let (Some([x_min, y_min, x_max, y_max]), Some(page)) =
                    (pending.take(), pages.last_mut())
                {
                    if !text.is_empty() {
                        page.push(WordBox {
                            text: text.to_string(),
                            left: x_min,
                            right: x_max,
                            bottom: page_height - y_max,
                            top: page_height - y_min,
                        });
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(DocSearchError::Extraction(format!(
                    "bad pdftotext -bbox output at {}: {e}",
                    reader.buffer_position()
                )))
            }
            _ => {}
        }
    }

    Ok(pages)
}

fn word_bounds(e: &BytesStart) -> Option<[f32; 4]> {
    Some([
        attr_f32(e, b"xMin")?,
        attr_f32(e, b"yMin")?,
        attr_f32(e, b"xMax")?,
        attr_f32(e, b"yMax")?,
    ])
}

fn attr_f32(e: &BytesStart, name: &[u8]) -> Option<f32> {
    let attr = e
        .attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == name)?;
    attr.unescape_value().ok()?.trim().parse().ok()
}
