use docsearch_core::config::Config;
use docsearch_core::convert::convert_file;
use docsearch_core::error::DocSearchError;
use docsearch_core::extraction::pdftotext::PdftotextExtractor;
use std::path::PathBuf;

use crate::output;

pub fn run(
    config: &Config,
    pdf_file: PathBuf,
    output_format: &str,
    output_file: Option<PathBuf>,
) -> Result<(), DocSearchError> {
    let extractor = PdftotextExtractor::new(&config.pdf.pdftotext_path);
    let records = convert_file(&pdf_file, &extractor)?;

    match output_file {
        Some(path) => {
            let json = serde_json::to_string_pretty(&records)?;
            std::fs::write(&path, json)?;
            eprintln!(
                "Converted {} record(s), written to {}",
                records.len(),
                path.display()
            );
        }
        None => match output_format {
            "json" => output::json::print(&records)?,
            _ => output::table::print_records(&records),
        },
    }

    Ok(())
}
