use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum DocSearchError {
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("text extraction failed: {0}")]
    Extraction(String),

    #[error("pdftotext not found. Install poppler: brew install poppler (macOS) or apt install poppler-utils (Linux)")]
    PdftotextNotFound,

    #[error("pdftotext failed with exit code {code}: {stderr}")]
    PdftotextFailed { code: i32, stderr: String },

    #[error("failed to parse spreadsheet {}: {reason}", .path.display())]
    Spreadsheet { path: PathBuf, reason: String },

    #[error("failed to read Word document: {0}")]
    Word(String),

    #[error("document list persistence failed: {0}")]
    Persistence(String),

    #[error("invalid configuration in {}: {reason}", .path.display())]
    Config { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
