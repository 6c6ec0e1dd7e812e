use docsearch_core::config::Config;
use docsearch_core::error::DocSearchError;
use docsearch_core::DocumentStore;
use std::path::Path;

pub fn run(config: &Config, file: &Path) -> Result<(), DocSearchError> {
    let store = DocumentStore::from_config(config);
    store.reload_persisted();

    let before = store.len();
    store.remove(file);
    if store.len() < before {
        eprintln!("Removed {}", file.display());
    } else {
        eprintln!("{} was not in the list", file.display());
    }
    Ok(())
}
