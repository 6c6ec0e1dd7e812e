use docsearch_core::model::{DocumentInfo, PriceRecord, SearchResult};

const DESCRIPTION_WIDTH: usize = 60;

pub fn print_documents(documents: &[DocumentInfo]) {
    if documents.is_empty() {
        println!("No documents.");
        return;
    }

    let max_name = documents.iter().map(|d| d.name.chars().count()).max().unwrap_or(10);
    for doc in documents {
        println!(
            "  {:<width$}  {:>10}  {}  {}",
            doc.name,
            format_size(doc.size),
            doc.timestamp.format("%Y-%m-%d %H:%M"),
            doc.path,
            width = max_name
        );
    }
}

pub fn print_results(results: &[SearchResult]) {
    if results.is_empty() {
        println!("No matches.");
        return;
    }

    let max_name = results
        .iter()
        .map(|r| r.document_name.chars().count())
        .max()
        .unwrap_or(10);
    for r in results {
        let page = if r.page == 0 {
            "-".to_string()
        } else {
            r.page.to_string()
        };
        println!(
            "  {:<width$}  page {:>4}  {}",
            r.document_name,
            page,
            r.document_path,
            width = max_name
        );
    }
}

pub fn print_records(records: &[PriceRecord]) {
    if records.is_empty() {
        println!("No price records.");
        return;
    }

    let max_pos = records
        .iter()
        .filter_map(|r| r.position_number.as_deref())
        .map(|p| p.chars().count())
        .max()
        .unwrap_or(0)
        .max(3);

    println!(
        "  {:<pw$}  {:<dw$}  {:<8}  {:>14}  {:>4}",
        "Poz",
        "Description",
        "Unit",
        "Price",
        "Page",
        pw = max_pos,
        dw = DESCRIPTION_WIDTH
    );
    for r in records {
        println!(
            "  {:<pw$}  {:<dw$}  {:<8}  {:>14}  {:>4}",
            r.position_number.as_deref().unwrap_or(""),
            truncate(r.description.as_deref().unwrap_or(""), DESCRIPTION_WIDTH),
            r.unit.as_deref().unwrap_or(""),
            r.price.as_deref().unwrap_or(""),
            r.page,
            pw = max_pos,
            dw = DESCRIPTION_WIDTH
        );
    }
    println!("\n  {} record(s)", records.len());
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(3)).collect();
    out.push_str("...");
    out
}

fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    match bytes {
        b if b >= MB => format!("{:.1} MB", b as f64 / MB as f64),
        b if b >= KB => format!("{:.1} KB", b as f64 / KB as f64),
        b => format!("{b} B"),
    }
}
