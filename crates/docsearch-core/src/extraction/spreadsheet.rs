use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};

use crate::error::DocSearchError;
use crate::extraction::{Extracted, FormatParser};
use crate::model::{FileFormat, PriceRecord};
use crate::parsing::{sheet::parse_sheet, Origin};

/// Used cells of one worksheet as text, starting at the first used cell.
#[derive(Debug, Clone)]
pub struct SheetRows {
    pub name: String,
    pub rows: Vec<Vec<String>>,
}

/// `.xlsx` / `.xls` via calamine. Read errors are returned, not swallowed.
pub struct SpreadsheetParser;

impl SpreadsheetParser {
    /// Every worksheet, in workbook order.
    pub fn read_sheets(path: &Path) -> Result<Vec<SheetRows>, DocSearchError> {
        let fail = |reason: String| DocSearchError::Spreadsheet {
            path: path.to_path_buf(),
            reason,
        };

        let mut workbook = open_workbook_auto(path).map_err(|e| fail(e.to_string()))?;

        let mut sheets = Vec::new();
        for name in workbook.sheet_names() {
            let range = workbook
                .worksheet_range(&name)
                .map_err(|e| fail(format!("sheet '{name}': {e}")))?;
            let rows = range
                .rows()
                .map(|row| row.iter().map(cell_as_string).collect())
                .collect();
            sheets.push(SheetRows { name, rows });
        }
        Ok(sheets)
    }
}

/// One line per row with content: non-blank cells joined by a space.
pub fn sheets_to_text(sheets: &[SheetRows]) -> String {
    let mut lines = Vec::new();
    for sheet in sheets {
        for row in &sheet.rows {
            let line = row
                .iter()
                .map(|c| c.trim())
                .filter(|c| !c.is_empty())
                .collect::<Vec<_>>()
                .join(" ");
            if !line.is_empty() {
                lines.push(line);
            }
        }
    }
    lines.join("\n")
}

fn sheets_to_records(path: &Path, sheets: &[SheetRows]) -> Vec<PriceRecord> {
    let origin = Origin::from_path(path);
    sheets
        .iter()
        .flat_map(|sheet| parse_sheet(&sheet.rows, &origin))
        .collect()
}

fn cell_as_string(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Empty => String::new(),
        _ => format!("{cell}"),
    }
}

impl FormatParser for SpreadsheetParser {
    fn format(&self) -> FileFormat {
        FileFormat::Spreadsheet
    }

    fn extract_text(&self, path: &Path) -> Result<String, DocSearchError> {
        Ok(sheets_to_text(&Self::read_sheets(path)?))
    }

    fn extract_records(&self, path: &Path) -> Result<Vec<PriceRecord>, DocSearchError> {
        Ok(sheets_to_records(path, &Self::read_sheets(path)?))
    }

    fn extract(&self, path: &Path) -> Result<Extracted, DocSearchError> {
        let sheets = Self::read_sheets(path)?;
        tracing::debug!(path = %path.display(), sheets = sheets.len(), "read workbook");
        Ok(Extracted {
            text: sheets_to_text(&sheets),
            records: sheets_to_records(path, &sheets),
        })
    }
}
