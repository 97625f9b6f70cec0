// ============================================================
// CELL VALUES
// ============================================================
// Typed value held by one table cell

use std::hash::{Hash, Hasher};

/// A single typed value in a [`super::Table`]
#[derive(Debug, Clone)]
pub enum Cell {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl Cell {
    /// Render the cell the way it appears in previews and error messages
    pub fn render(&self) -> String {
        match self {
            Cell::Null => "NaN".to_string(),
            Cell::Integer(value) => value.to_string(),
            Cell::Real(value) => value.to_string(),
            Cell::Text(value) => value.clone(),
        }
    }

    /// Value used when matching join keys: integral reals compare equal to
    /// the integer of the same value.
    pub fn join_key(&self) -> Cell {
        match self {
            Cell::Real(value)
                if value.fract() == 0.0 && *value >= i64::MIN as f64 && *value < i64::MAX as f64 =>
            {
                Cell::Integer(*value as i64)
            }
            other => other.clone(),
        }
    }
}

// Reals compare by bit pattern so rows can be hashed for deduplication.
impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Cell::Null, Cell::Null) => true,
            (Cell::Integer(a), Cell::Integer(b)) => a == b,
            (Cell::Real(a), Cell::Real(b)) => a.to_bits() == b.to_bits(),
            (Cell::Text(a), Cell::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Cell {}

impl Hash for Cell {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Cell::Null => {}
            Cell::Integer(value) => value.hash(state),
            Cell::Real(value) => value.to_bits().hash(state),
            Cell::Text(value) => value.hash(state),
        }
    }
}

/// Storage class inferred for a whole column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Real,
    Text,
}

impl ColumnType {
    /// Infer the type of a column of raw CSV values.
    /// Empty values are ignored; an all-empty column is text.
    pub fn infer_raw<'a, I>(values: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut all_integer = true;
        let mut all_real = true;
        let mut seen = false;

        for value in values {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                continue;
            }
            seen = true;
            if all_integer && trimmed.parse::<i64>().is_err() {
                all_integer = false;
            }
            if trimmed.parse::<f64>().is_err() {
                all_real = false;
                break;
            }
        }

        match (seen, all_integer, all_real) {
            (false, _, _) => ColumnType::Text,
            (true, true, _) => ColumnType::Integer,
            (true, false, true) => ColumnType::Real,
            _ => ColumnType::Text,
        }
    }

    /// Infer the storage class of already typed cells
    pub fn infer_cells<'a, I>(cells: I) -> Self
    where
        I: IntoIterator<Item = &'a Cell>,
    {
        let mut result: Option<ColumnType> = None;

        for cell in cells {
            let current = match cell {
                Cell::Null => continue,
                Cell::Integer(_) => ColumnType::Integer,
                Cell::Real(_) => ColumnType::Real,
                Cell::Text(_) => return ColumnType::Text,
            };
            result = Some(match (result, current) {
                (Some(ColumnType::Real), _) | (_, ColumnType::Real) => ColumnType::Real,
                _ => ColumnType::Integer,
            });
        }

        result.unwrap_or(ColumnType::Text)
    }

    /// Convert one raw CSV value into a cell of this type
    pub fn to_cell(self, raw: &str) -> Cell {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Cell::Null;
        }
        match self {
            ColumnType::Integer => trimmed
                .parse()
                .map(Cell::Integer)
                .unwrap_or_else(|_| Cell::Text(raw.to_string())),
            ColumnType::Real => trimmed
                .parse()
                .map(Cell::Real)
                .unwrap_or_else(|_| Cell::Text(raw.to_string())),
            ColumnType::Text => Cell::Text(raw.to_string()),
        }
    }

    pub fn sql_type(self) -> &'static str {
        match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::Real => "REAL",
            ColumnType::Text => "TEXT",
        }
    }
}
