use docsearch_core::config::Config;
use docsearch_core::error::DocSearchError;
use docsearch_core::DocumentStore;

use crate::output;

pub fn run(config: &Config, query: &str, output_format: &str) -> Result<(), DocSearchError> {
    let store = DocumentStore::from_config(config);
    store.reload_persisted();

    let results = store.search(query);
    match output_format {
        "json" => output::json::print(&results)?,
        _ => output::table::print_results(&results),
    }
    eprintln!(
        "{} match(es) in {} document(s)",
        results.len(),
        store.len()
    );
    Ok(())
}
