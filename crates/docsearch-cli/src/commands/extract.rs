use docsearch_core::config::Config;
use docsearch_core::error::DocSearchError;
use docsearch_core::extraction::FormatRegistry;
use std::path::PathBuf;

use crate::output;

pub fn run(
    config: &Config,
    input_file: PathBuf,
    output_format: &str,
    output_file: Option<PathBuf>,
) -> Result<(), DocSearchError> {
    let registry = FormatRegistry::new(config);
    let extracted = docsearch_core::extract_file(&input_file, &registry)?;

    match output_file {
        Some(path) => {
            // Always write JSON when saving to file
            let json = serde_json::to_string_pretty(&extracted)?;
            std::fs::write(&path, json)?;
            eprintln!(
                "Extracted {} record(s), written to {}",
                extracted.records.len(),
                path.display()
            );
        }
        None => match output_format {
            "json" => output::json::print(&extracted)?,
            _ => {
                println!("{}", extracted.text);
                output::table::print_records(&extracted.records);
            }
        },
    }

    Ok(())
}
