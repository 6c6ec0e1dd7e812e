//! Runtime configuration, read from an optional TOML file.
//!
//! Every field has a default, so an empty file (or no file at all) yields a
//! working setup.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::DocSearchError;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub pdf: PdfConfig,
    pub word: WordConfig,
    pub search: SearchConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Where the metadata-only document list is kept.
    pub metadata_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            metadata_path: default_data_dir().join("documents.json"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    pub pdftotext_path: PathBuf,
    /// Max distance between word bottoms on the same line, in PDF units.
    pub line_tolerance: f32,
    /// Horizontal gaps wider than this become a tab (column separator).
    pub column_gap: f32,
}

impl Default for PdfConfig {
    fn default() -> Self {
        PdfConfig {
            pdftotext_path: PathBuf::from("pdftotext"),
            line_tolerance: 2.0,
            column_gap: 10.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WordConfig {
    /// Render Word files to PDF first to get page numbers.
    pub render_pages: bool,
    pub office_path: PathBuf,
}

impl Default for WordConfig {
    fn default() -> Self {
        WordConfig {
            render_pages: true,
            office_path: PathBuf::from("soffice"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub debounce_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig { debounce_ms: 300 }
    }
}

impl SearchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Config {
    /// Load from `path`, falling back to defaults when the file is absent.
    pub fn load(path: &Path) -> Result<Config, DocSearchError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Config::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| DocSearchError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Config::parse(&content, path)
    }

    pub fn parse(content: &str, source: &Path) -> Result<Config, DocSearchError> {
        let config: Config = toml::from_str(content).map_err(|e| DocSearchError::Config {
            path: source.to_path_buf(),
            reason: e.to_string(),
        })?;
        config.validate(source)?;
        Ok(config)
    }

    fn validate(&self, source: &Path) -> Result<(), DocSearchError> {
        let invalid = |reason: &str| DocSearchError::Config {
            path: source.to_path_buf(),
            reason: reason.to_string(),
        };
        if self.pdf.line_tolerance.is_nan() || self.pdf.line_tolerance < 0.0 {
            return Err(invalid("pdf.line_tolerance must be a non-negative number"));
        }
        if self.pdf.column_gap.is_nan() || self.pdf.column_gap < 0.0 {
            return Err(invalid("pdf.column_gap must be a non-negative number"));
        }
        if self.storage.metadata_path.as_os_str().is_empty() {
            return Err(invalid("storage.metadata_path must not be empty"));
        }
        Ok(())
    }

    /// Default location of the config file.
    pub fn default_path() -> PathBuf {
        default_data_dir().join("config.toml")
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("docsearch")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let c = Config::parse("", Path::new("test.toml")).unwrap();
        assert_eq!(c.pdf.line_tolerance, 2.0);
        assert_eq!(c.pdf.column_gap, 10.0);
        assert_eq!(c.search.debounce_ms, 300);
        assert!(c.word.render_pages);
        assert!(c.storage.metadata_path.ends_with("documents.json"));
    }

    #[test]
    fn partial_sections_override() {
        let toml = r#"
[storage]
metadata_path = "/tmp/docs.json"

[pdf]
column_gap = 12.5

[word]
render_pages = false
"#;
        let c = Config::parse(toml, Path::new("test.toml")).unwrap();
        assert_eq!(c.storage.metadata_path, PathBuf::from("/tmp/docs.json"));
        assert_eq!(c.pdf.column_gap, 12.5);
        assert_eq!(c.pdf.line_tolerance, 2.0);
        assert!(!c.word.render_pages);
    }

    #[test]
    fn negative_tolerance_rejected() {
        let err = Config::parse("[pdf]\nline_tolerance = -1.0\n", Path::new("c.toml")).unwrap_err();
        assert!(matches!(err, DocSearchError::Config { .. }));
    }

    #[test]
    fn malformed_toml_rejected() {
        let err = Config::parse("[pdf\n", Path::new("c.toml")).unwrap_err();
        assert!(matches!(err, DocSearchError::Config { .. }));
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let c = Config::load(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(c.search.debounce(), Duration::from_millis(300));
    }
}
