use docsearch_core::config::Config;
use docsearch_core::error::DocSearchError;
use docsearch_core::model::DocumentInfo;
use docsearch_core::DocumentStore;

use crate::output;

pub fn run(config: &Config, output_format: &str) -> Result<(), DocSearchError> {
    let store = DocumentStore::from_config(config);
    let summary = store.reload_persisted();

    let documents: Vec<DocumentInfo> = store.list().iter().map(|d| d.info()).collect();
    match output_format {
        "json" => output::json::print(&documents)?,
        _ => output::table::print_documents(&documents),
    }

    if summary.skipped > 0 || summary.failed > 0 {
        eprintln!(
            "  {} missing and {} unreadable document(s) left out",
            summary.skipped, summary.failed
        );
    }
    Ok(())
}
