pub mod config;
pub mod convert;
pub mod debounce;
pub mod error;
pub mod extraction;
pub mod model;
pub mod parsing;
pub mod persist;
pub mod search;
pub mod store;

use std::path::Path;

use error::DocSearchError;
use extraction::{Extracted, FormatRegistry};

pub use search::search;
pub use store::DocumentStore;

/// Run the format parser for `path` without touching any store.
///
/// Unlike [`DocumentStore::ingest`], an unknown extension is an error here.
pub fn extract_file(path: &Path, registry: &FormatRegistry) -> Result<Extracted, DocSearchError> {
    if !path.is_file() {
        return Err(DocSearchError::FileNotFound(path.to_path_buf()));
    }
    let parser = registry.parser_for(path).ok_or_else(|| {
        DocSearchError::UnsupportedFormat(
            path.extension()
                .map(|e| e.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
        )
    })?;
    parser.extract(path)
}
