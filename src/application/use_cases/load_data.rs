// ============================================================
// DATA LOADER
// ============================================================
// Read the messages and categories files and join them on `id`

use std::collections::HashMap;
use std::path::Path;

use tracing::info;

use crate::domain::error::{AppError, Result};
use crate::domain::pipeline_config::PipelineConfig;
use crate::domain::table::{Cell, ColumnType, Table};
use crate::infrastructure::csv::CsvParser;

/// Join key shared by both datasets
pub const ID_COLUMN: &str = "id";

const LEFT_SUFFIX: &str = "_x";
const RIGHT_SUFFIX: &str = "_y";

/// Output of the loader
#[derive(Debug, Clone)]
pub struct LoadedData {
    /// Messages joined with categories, raw encoded column included
    pub joined: Table,

    /// Position of the encoded category column inside `joined`
    pub encoded_column: usize,

    /// Categories file as read
    pub categories: Table,

    /// Position of the encoded category column inside `categories`
    pub categories_column: usize,
}

pub struct DataLoader {
    parser: CsvParser,
    categories_column: Option<String>,
}

impl DataLoader {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            parser: CsvParser::new()
                .with_delimiter(config.delimiter_byte())
                .with_trim(config.trim),
            categories_column: config.categories_column.clone(),
        }
    }

    /// Parse both files and join them
    pub fn load(&self, messages_path: &Path, categories_path: &Path) -> Result<LoadedData> {
        let messages = self.parser.parse_file(messages_path)?;
        info!(path = %messages_path.display(), rows = messages.len(), "Loaded messages");

        let categories = self.parser.parse_file(categories_path)?;
        info!(path = %categories_path.display(), rows = categories.len(), "Loaded categories");

        self.join(messages, categories)
    }

    /// Join already parsed tables
    pub fn join(&self, messages: Table, categories: Table) -> Result<LoadedData> {
        let categories_column = self.resolve_categories_column(&categories)?;
        let joined = inner_join(&messages, &categories, ID_COLUMN)?;

        let right_key = categories.require_column(ID_COLUMN)?;
        let skipped_key = usize::from(right_key < categories_column);
        let encoded_column = messages.columns().len() + categories_column - skipped_key;

        info!(rows = joined.len(), "Joined messages with categories");
        Ok(LoadedData {
            joined,
            encoded_column,
            categories,
            categories_column,
        })
    }

    /// Configured column, or the first column that is not the join key
    fn resolve_categories_column(&self, categories: &Table) -> Result<usize> {
        categories.require_column(ID_COLUMN)?;

        match &self.categories_column {
            Some(name) => {
                let index = categories.require_column(name)?;
                if name == ID_COLUMN {
                    return Err(AppError::ValidationError(
                        "Categories column cannot be the id column".to_string(),
                    ));
                }
                Ok(index)
            }
            None => categories
                .columns()
                .iter()
                .position(|column| column != ID_COLUMN)
                .ok_or_else(|| {
                    AppError::ParseError(
                        "Categories file has no column besides 'id'".to_string(),
                    )
                }),
        }
    }
}

/// Inner join on `key`.
///
/// Rows follow left order, then right order among matches; duplicate keys
/// produce every matching pair. Keys match by [`Cell::join_key`], so `1` and
/// `1.0` pair up. Non-key columns present on both sides get `_x`/`_y`
/// suffixes. Declared column types carry over to the result.
pub fn inner_join(left: &Table, right: &Table, key: &str) -> Result<Table> {
    let left_key = left.require_column(key)?;
    let right_key = right.require_column(key)?;

    let mut columns: Vec<(String, Option<ColumnType>)> = left
        .columns()
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let collides = idx != left_key
                && right
                    .columns()
                    .iter()
                    .enumerate()
                    .any(|(r, other)| r != right_key && other == name);
            let name = if collides {
                format!("{}{}", name, LEFT_SUFFIX)
            } else {
                name.clone()
            };
            (name, left.column_type(idx))
        })
        .collect();

    for (idx, name) in right.columns().iter().enumerate() {
        if idx == right_key {
            continue;
        }
        let collides = left
            .columns()
            .iter()
            .enumerate()
            .any(|(l, other)| l != left_key && other == name);
        let name = if collides {
            format!("{}{}", name, RIGHT_SUFFIX)
        } else {
            name.clone()
        };
        columns.push((name, right.column_type(idx)));
    }

    let mut index: HashMap<Cell, Vec<usize>> = HashMap::new();
    for (row_idx, row) in right.rows().iter().enumerate() {
        index.entry(row[right_key].join_key()).or_default().push(row_idx);
    }

    let mut joined = Table::with_types(columns);
    for left_row in left.rows() {
        let Some(matches) = index.get(&left_row[left_key].join_key()) else {
            continue;
        };
        for &right_idx in matches {
            let right_row = &right.rows()[right_idx];
            let mut row = left_row.clone();
            row.extend(
                right_row
                    .iter()
                    .enumerate()
                    .filter(|(idx, _)| *idx != right_key)
                    .map(|(_, cell)| cell.clone()),
            );
            joined.push_row(row)?;
        }
    }

    Ok(joined)
}
