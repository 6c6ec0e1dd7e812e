use docsearch_core::config::Config;
use docsearch_core::error::DocSearchError;
use docsearch_core::DocumentStore;
use std::path::PathBuf;
use std::sync::Arc;

use crate::output;

pub async fn run(
    config: &Config,
    files: Vec<PathBuf>,
    output_format: &str,
) -> Result<(), DocSearchError> {
    let store = Arc::new(DocumentStore::from_config(config));
    store.reload_persisted();

    let total = files.len();
    let mut ingested = Vec::new();
    for (path, result) in store.ingest_many(files).await {
        match result {
            Ok(document) => ingested.push(document.info()),
            Err(e) => eprintln!("  failed: {}: {e}", path.display()),
        }
    }

    match output_format {
        "json" => output::json::print(&ingested)?,
        _ => output::table::print_documents(&ingested),
    }

    let failed = total - ingested.len();
    eprintln!(
        "Ingested {} of {total} file(s), {} document(s) in the list",
        ingested.len(),
        store.len()
    );
    if failed > 0 {
        return Err(DocSearchError::Extraction(format!(
            "{failed} file(s) could not be ingested"
        )));
    }
    Ok(())
}
