use docsearch_core::error::DocSearchError;
use serde::Serialize;

pub fn print<T: Serialize + ?Sized>(value: &T) -> Result<(), DocSearchError> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}
