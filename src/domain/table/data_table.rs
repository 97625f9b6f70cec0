// ============================================================
// DATA TABLE
// ============================================================
// Row-major in-memory table with named columns

use std::fmt;

use super::{Cell, ColumnType};
use crate::domain::error::{AppError, Result};

const PREVIEW_CELL_WIDTH: usize = 40;

/// In-memory table. Every row holds exactly one cell per column.
///
/// A column may carry a declared type; undeclared columns are typed from
/// their cells when the table is stored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    column_types: Vec<Option<ColumnType>>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Create an empty table with the given header and no declared types
    pub fn new(columns: Vec<String>) -> Self {
        let column_types = vec![None; columns.len()];
        Self {
            columns,
            column_types,
            rows: Vec::new(),
        }
    }

    /// Create an empty table whose columns all carry a declared type
    pub fn with_types(columns: Vec<(String, Option<ColumnType>)>) -> Self {
        let (columns, column_types) = columns.into_iter().unzip();
        Self {
            columns,
            column_types,
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_type(&self, index: usize) -> Option<ColumnType> {
        self.column_types.get(index).copied().flatten()
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// Look up a column, failing with a parse error when it is missing
    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name).ok_or_else(|| {
            AppError::ParseError(format!(
                "Missing required column '{}' (found: {})",
                name,
                self.columns.join(", ")
            ))
        })
    }

    /// Iterate over the values of one column
    pub fn column_cells(&self, index: usize) -> impl Iterator<Item = &Cell> {
        self.rows.iter().map(move |row| &row[index])
    }

    pub fn push_row(&mut self, row: Vec<Cell>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(AppError::Internal(format!(
                "Row has {} cells but table has {} columns",
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Remove a column and return its cells in row order
    pub fn take_column(&mut self, index: usize) -> Vec<Cell> {
        self.columns.remove(index);
        self.column_types.remove(index);
        self.rows.iter_mut().map(|row| row.remove(index)).collect()
    }

    /// Append a column at the right edge of the table. A declared type holds
    /// even when the table has no rows.
    pub fn append_column(
        &mut self,
        name: String,
        column_type: Option<ColumnType>,
        cells: Vec<Cell>,
    ) -> Result<()> {
        if self.column_index(&name).is_some() {
            return Err(AppError::ValidationError(format!(
                "Column '{}' already exists",
                name
            )));
        }
        if cells.len() != self.rows.len() {
            return Err(AppError::Internal(format!(
                "Column '{}' has {} values but table has {} rows",
                name,
                cells.len(),
                self.rows.len()
            )));
        }
        self.columns.push(name);
        self.column_types.push(column_type);
        for (row, cell) in self.rows.iter_mut().zip(cells) {
            row.push(cell);
        }
        Ok(())
    }

    /// Keep only rows accepted by the predicate, preserving order
    pub fn retain_rows<F>(&mut self, keep: F)
    where
        F: FnMut(&Vec<Cell>) -> bool,
    {
        self.rows.retain(keep);
    }

    /// Text grid of the first `limit` rows
    pub fn preview(&self, limit: usize) -> TablePreview<'_> {
        TablePreview { table: self, limit }
    }
}

/// Display adapter that renders the head of a table as an aligned grid
pub struct TablePreview<'a> {
    table: &'a Table,
    limit: usize,
}

impl TablePreview<'_> {
    fn clip(value: String) -> String {
        if value.chars().count() <= PREVIEW_CELL_WIDTH {
            return value;
        }
        let kept: String = value.chars().take(PREVIEW_CELL_WIDTH - 3).collect();
        format!("{}...", kept)
    }
}

impl fmt::Display for TablePreview<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shown = self.table.rows.len().min(self.limit);

        let mut grid: Vec<Vec<String>> = Vec::with_capacity(shown + 1);
        let mut header = vec![String::new()];
        header.extend(self.table.columns.iter().cloned().map(Self::clip));
        grid.push(header);

        for (position, row) in self.table.rows.iter().take(shown).enumerate() {
            let mut line = vec![position.to_string()];
            line.extend(row.iter().map(|cell| Self::clip(cell.render())));
            grid.push(line);
        }

        let mut widths = vec![0usize; grid[0].len()];
        for line in &grid {
            for (idx, value) in line.iter().enumerate() {
                widths[idx] = widths[idx].max(value.chars().count());
            }
        }

        for (line_no, line) in grid.iter().enumerate() {
            let rendered: Vec<String> = line
                .iter()
                .enumerate()
                .map(|(idx, value)| format!("{:>width$}", value, width = widths[idx]))
                .collect();
            if line_no > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", rendered.join("  ").trim_end())?;
        }

        if self.table.rows.len() > shown {
            write!(f, "\n[{} rows x {} columns]", self.table.rows.len(), self.table.columns.len())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        let mut table = Table::new(vec!["id".to_string(), "message".to_string()]);
        table
            .push_row(vec![Cell::Integer(1), Cell::Text("help".to_string())])
            .unwrap();
        table
            .push_row(vec![Cell::Integer(2), Cell::Text("water".to_string())])
            .unwrap();
        table
    }

    #[test]
    fn test_push_row_rejects_wrong_width() {
        let mut table = sample();
        assert!(table.push_row(vec![Cell::Integer(3)]).is_err());
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_take_and_append_column() {
        let mut table = sample();
        let messages = table.take_column(1);
        assert_eq!(table.columns(), &["id".to_string()]);
        assert_eq!(messages[1], Cell::Text("water".to_string()));

        table
            .append_column("related".to_string(), None, vec![Cell::Integer(1), Cell::Integer(0)])
            .unwrap();
        assert_eq!(table.rows()[1], vec![Cell::Integer(2), Cell::Integer(0)]);
    }

    #[test]
    fn test_column_types_follow_columns() {
        let mut table = Table::with_types(vec![
            ("id".to_string(), Some(ColumnType::Integer)),
            ("message".to_string(), None),
        ]);
        table
            .append_column("related".to_string(), Some(ColumnType::Integer), Vec::new())
            .unwrap();

        assert_eq!(table.column_type(1), None);
        assert_eq!(table.column_type(2), Some(ColumnType::Integer));

        table.take_column(0);
        assert_eq!(table.columns(), &["message", "related"]);
        assert_eq!(table.column_type(0), None);
        assert_eq!(table.column_type(1), Some(ColumnType::Integer));
        assert_eq!(table.column_type(5), None);
    }

    #[test]
    fn test_append_duplicate_column_fails() {
        let mut table = sample();
        let err = table
            .append_column("id".to_string(), None, vec![Cell::Null, Cell::Null])
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[test]
    fn test_require_missing_column() {
        let table = sample();
        assert!(matches!(table.require_column("genre"), Err(AppError::ParseError(_))));
        assert_eq!(table.require_column("message").unwrap(), 1);
    }

    #[test]
    fn test_preview_limits_rows() {
        let table = sample();
        let text = table.preview(1).to_string();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("id") && lines[0].contains("message"));
        assert!(lines[1].contains("help"));
        assert_eq!(lines[2], "[2 rows x 2 columns]");
    }

    #[test]
    fn test_preview_clips_long_text() {
        let mut table = Table::new(vec!["message".to_string()]);
        table.push_row(vec![Cell::Text("x".repeat(100))]).unwrap();
        let text = table.preview(5).to_string();
        assert!(text.contains(&format!("{}...", "x".repeat(37))));
        assert!(!text.contains(&"x".repeat(38)));
    }
}
