//! Table types.

use serde::{Deserialize, Serialize};

/// A table sized up front, filled cell by cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Rows in the table
    pub rows: Vec<TableRow>,
}

impl Table {
    /// Create a table of `rows` x `cols` empty cells.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows: (0..rows)
                .map(|_| TableRow {
                    cells: (0..cols).map(|_| TableCell::default()).collect(),
                })
                .collect(),
        }
    }

    /// Set the text of a cell. Out-of-range coordinates are ignored, matching
    /// the source-side rule that overflow cells are dropped.
    pub fn set_cell(&mut self, row: usize, col: usize, text: impl Into<String>, bold: bool) {
        if let Some(cell) = self
            .rows
            .get_mut(row)
            .and_then(|r| r.cells.get_mut(col))
        {
            cell.text = text.into();
            cell.bold = bold;
        }
    }

    /// Get a cell by position.
    pub fn cell(&self, row: usize, col: usize) -> Option<&TableCell> {
        self.rows.get(row).and_then(|r| r.cells.get(col))
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns (all rows are equal width by construction).
    pub fn column_count(&self) -> usize {
        self.rows.first().map(|r| r.cells.len()).unwrap_or(0)
    }

    /// Check if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Tab-separated plain text representation.
    pub fn plain_text(&self) -> String {
        self.rows
            .iter()
            .map(|row| row.plain_text())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A table row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    /// Cells in the row
    pub cells: Vec<TableCell>,
}

impl TableRow {
    /// Tab-separated plain text of the row.
    pub fn plain_text(&self) -> String {
        self.cells
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join("\t")
    }
}

/// A table cell.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableCell {
    /// Cell text (trimmed by the converters)
    pub text: String,

    /// Whether the cell renders bold (header cells)
    pub bold: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_dimensions() {
        let table = Table::new(3, 2);
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.column_count(), 2);
        assert!(!table.is_empty());
    }

    #[test]
    fn test_set_cell_out_of_range_is_ignored() {
        let mut table = Table::new(1, 1);
        table.set_cell(0, 0, "ok", false);
        table.set_cell(0, 5, "dropped", false);
        table.set_cell(9, 0, "dropped", false);

        assert_eq!(table.cell(0, 0).unwrap().text, "ok");
        assert_eq!(table.column_count(), 1);
    }

    #[test]
    fn test_plain_text() {
        let mut table = Table::new(2, 2);
        table.set_cell(0, 0, "Name", true);
        table.set_cell(0, 1, "Age", true);
        table.set_cell(1, 0, "Alice", false);
        table.set_cell(1, 1, "30", false);

        assert_eq!(table.plain_text(), "Name\tAge\nAlice\t30");
    }
}
