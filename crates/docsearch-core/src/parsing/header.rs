use super::normalize::fold_for_match;

/// Rows scanned for a header before giving up.
pub const HEADER_SCAN_ROWS: usize = 20;

/// Semantic role of a table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    PositionNumber,
    Description,
    Unit,
    Price,
}

impl ColumnRole {
    pub const ALL: [ColumnRole; 4] = [
        ColumnRole::PositionNumber,
        ColumnRole::Description,
        ColumnRole::Unit,
        ColumnRole::Price,
    ];

    /// Does a header cell (already folded) name this role?
    fn matches(self, cell: &str) -> bool {
        match self {
            ColumnRole::PositionNumber => {
                cell.contains("poz no")
                    || cell.contains("pozno")
                    || (cell.contains("poz") && cell.contains("no"))
                    || (cell.contains("position") && cell.contains("no"))
                    || cell.contains("item no")
            }
            ColumnRole::Description => ["tanim", "aciklama", "description", "definition"]
                .iter()
                .any(|kw| cell.contains(kw)),
            ColumnRole::Unit => cell.contains("birim") || cell.contains("unit"),
            ColumnRole::Price => ["fiyat", "endeks", "tuik", "price", "index"]
                .iter()
                .any(|kw| cell.contains(kw)),
        }
    }
}

/// Column index per role, as discovered from header cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnMap {
    pub position_number: Option<usize>,
    pub description: Option<usize>,
    pub unit: Option<usize>,
    pub price: Option<usize>,
}

impl ColumnMap {
    fn slot(&mut self, role: ColumnRole) -> &mut Option<usize> {
        match role {
            ColumnRole::PositionNumber => &mut self.position_number,
            ColumnRole::Description => &mut self.description,
            ColumnRole::Unit => &mut self.unit,
            ColumnRole::Price => &mut self.price,
        }
    }

    /// Classify one header cell. The first column found for a role wins.
    /// Returns true if the cell assigned a new role.
    pub fn observe(&mut self, col: usize, cell: &str) -> bool {
        let folded = fold_for_match(cell.trim());
        if folded.is_empty() {
            return false;
        }
        let mut assigned = false;
        for role in ColumnRole::ALL {
            let slot = self.slot(role);
            if slot.is_none() && role.matches(&folded) {
                *slot = Some(col);
                assigned = true;
            }
        }
        assigned
    }

    pub fn is_empty(&self) -> bool {
        *self == ColumnMap::default()
    }

    /// Position number and description both known.
    pub fn has_key_columns(&self) -> bool {
        self.position_number.is_some() && self.description.is_some()
    }

    /// Fill unknown roles with the first four columns, in role order.
    pub fn resolve(&self) -> Columns {
        Columns {
            position_number: self.position_number.unwrap_or(0),
            description: self.description.unwrap_or(1),
            unit: self.unit.unwrap_or(2),
            price: self.price.unwrap_or(3),
        }
    }
}

/// Fully resolved column indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Columns {
    pub position_number: usize,
    pub description: usize,
    pub unit: usize,
    pub price: usize,
}

/// Classify a single header row.
pub fn classify_row<S: AsRef<str>>(row: &[S]) -> ColumnMap {
    let mut map = ColumnMap::default();
    for (col, cell) in row.iter().enumerate() {
        map.observe(col, cell.as_ref());
    }
    map
}

/// Find the header row among the first [`HEADER_SCAN_ROWS`] rows.
///
/// Roles accumulate across rows. The header row is the last row that
/// contributed a role; scanning stops as soon as both the position-number
/// and description columns are known. Returns `None` when no row names any
/// role.
pub fn detect_header<S: AsRef<str>>(rows: &[Vec<S>]) -> Option<(usize, ColumnMap)> {
    let mut map = ColumnMap::default();
    let mut header_row = None;

    for (i, row) in rows.iter().enumerate().take(HEADER_SCAN_ROWS) {
        let mut contributed = false;
        for (col, cell) in row.iter().enumerate() {
            contributed |= map.observe(col, cell.as_ref());
        }
        if contributed {
            header_row = Some(i);
        }
        if map.has_key_columns() {
            break;
        }
    }

    header_row.map(|row| (row, map))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn english_header() {
        let map = classify_row(&["Position No", "Description", "Unit", "Price"]);
        assert_eq!(
            map.resolve(),
            Columns {
                position_number: 0,
                description: 1,
                unit: 2,
                price: 3
            }
        );
    }

    #[test]
    fn turkish_header_any_case() {
        let map = classify_row(&["Sıra", "POZ NO", "TANIMI", "BİRİMİ", "TÜİK Fiyatı"]);
        assert_eq!(map.position_number, Some(1));
        assert_eq!(map.description, Some(2));
        assert_eq!(map.unit, Some(3));
        assert_eq!(map.price, Some(4));
    }

    #[test]
    fn aciklama_is_description() {
        let map = classify_row(&["Açıklama"]);
        assert_eq!(map.description, Some(0));
    }

    #[test]
    fn first_column_wins() {
        let map = classify_row(&["Birim", "Birim Fiyat"]);
        assert_eq!(map.unit, Some(0));
        assert_eq!(map.price, Some(1));
    }

    #[test]
    fn missing_roles_default_to_position() {
        let map = classify_row(&["", "", "Fiyat"]);
        let cols = map.resolve();
        assert_eq!(cols.position_number, 0);
        assert_eq!(cols.description, 1);
        assert_eq!(cols.unit, 2);
        assert_eq!(cols.price, 2);
    }

    #[test]
    fn detect_header_below_title_rows() {
        let rows = vec![
            row(&["2024 Yılı Listesi"]),
            row(&[""]),
            row(&["Poz No", "Tanım", "Birim", "Fiyat"]),
            row(&["15.100.1001", "Kazı", "m³", "12,50"]),
        ];
        let (header_row, map) = detect_header(&rows).unwrap();
        assert_eq!(header_row, 2);
        assert!(map.has_key_columns());
        assert_eq!(map.unit, Some(2));
    }

    #[test]
    fn detect_header_stops_at_key_columns() {
        let rows = vec![
            row(&["Poz No", "Tanım"]),
            row(&["", "", "Birim", "Fiyat"]),
        ];
        let (header_row, map) = detect_header(&rows).unwrap();
        assert_eq!(header_row, 0);
        assert_eq!(map.unit, None);
        assert_eq!(map.price, None);
    }

    #[test]
    fn detect_header_keeps_last_contributing_row() {
        let rows = vec![
            row(&["", "Tanım"]),
            row(&["", "", "Birim"]),
            row(&["15.100.1001", "Kazı", "m³"]),
        ];
        let (header_row, map) = detect_header(&rows).unwrap();
        assert_eq!(header_row, 1);
        assert_eq!(map.position_number, None);
        assert_eq!(map.unit, Some(2));
    }

    #[test]
    fn detect_header_none_found() {
        let rows = vec![row(&["15.100.1001", "Kazı"])];
        assert!(detect_header(&rows).is_none());
    }

    #[test]
    fn detect_header_only_scans_window() {
        let mut rows: Vec<Vec<String>> = (0..HEADER_SCAN_ROWS).map(|_| row(&["x"])).collect();
        rows.push(row(&["Poz No", "Tanım"]));
        assert!(detect_header(&rows).is_none());
    }
}
