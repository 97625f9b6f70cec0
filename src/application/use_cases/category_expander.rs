// ============================================================
// CATEGORY EXPANDER
// ============================================================
// Replace the encoded category column with one integer column per label

use tracing::{info, warn};

use crate::application::use_cases::load_data::LoadedData;
use crate::domain::category::CategoryLabels;
use crate::domain::error::{AppError, Result};
use crate::domain::table::{Cell, ColumnType, Table};

pub struct CategoryExpander {
    strict_labels: bool,
}

impl CategoryExpander {
    pub fn new(strict_labels: bool) -> Self {
        Self { strict_labels }
    }

    /// Labels of the first category record, `None` when there are no records
    pub fn derive_labels(categories: &Table, column: usize) -> Result<Option<CategoryLabels>> {
        match categories.rows().first() {
            Some(row) => {
                let encoded = encoded_text(&row[column], 0)?;
                CategoryLabels::from_encoded(&encoded).map(Some)
            }
            None => Ok(None),
        }
    }

    /// Expand the joined table of a load into its final shape
    pub fn expand_loaded(&self, loaded: LoadedData) -> Result<Table> {
        let labels = Self::derive_labels(&loaded.categories, loaded.categories_column)?;
        let mut table = loaded.joined;

        match labels {
            Some(labels) => self.expand(&mut table, loaded.encoded_column, &labels)?,
            None => {
                warn!("Categories file has no rows, output has no indicator columns");
                table.take_column(loaded.encoded_column);
            }
        }

        Ok(table)
    }

    /// Drop the encoded column at `column` and append one indicator column per
    /// label, in label order. Row count and order are unchanged.
    pub fn expand(&self, table: &mut Table, column: usize, labels: &CategoryLabels) -> Result<()> {
        let encoded = table.take_column(column);

        let mut indicator_columns: Vec<Vec<Cell>> =
            vec![Vec::with_capacity(encoded.len()); labels.len()];

        for (row, cell) in encoded.iter().enumerate() {
            let text = encoded_text(cell, row)?;
            let values = labels.indicators(&text, row, self.strict_labels)?;
            for (target, value) in indicator_columns.iter_mut().zip(values) {
                target.push(Cell::Integer(value));
            }
        }

        for (label, cells) in labels.labels().iter().zip(indicator_columns) {
            table.append_column(label.clone(), Some(ColumnType::Integer), cells)?;
        }

        info!(labels = labels.len(), rows = table.len(), "Expanded category column");
        Ok(())
    }
}

fn encoded_text(cell: &Cell, row: usize) -> Result<String> {
    match cell {
        Cell::Null => Err(AppError::ParseError(format!(
            "Row {} has no category string",
            row
        ))),
        Cell::Text(value) => Ok(value.clone()),
        other => Ok(other.render()),
    }
}
