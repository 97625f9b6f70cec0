// ============================================================
// PIPELINE CONFIGURATION
// ============================================================
// Settings for loading, expanding and persisting the datasets

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::domain::error::{AppError, Result};

/// Table written by the sink unless configured otherwise
pub const DEFAULT_TABLE_NAME: &str = "twt_disaster_clean";

/// Configuration for one pipeline run
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct PipelineConfig {
    /// Destination table, dropped and recreated on every run
    #[validate(length(min = 1, max = 128))]
    pub table_name: String,

    /// Number of rows printed in the preview before saving (default: 5)
    #[validate(range(min = 1, max = 1000))]
    pub preview_rows: usize,

    /// Field delimiter of both input files (default: comma)
    #[validate(custom(function = "validate_delimiter"))]
    pub delimiter: char,

    /// Trim whitespace around every field
    pub trim: bool,

    /// Encoded category column; `None` selects the second column of the file
    pub categories_column: Option<String>,

    /// Reject rows whose labels differ from the first category row
    pub strict_labels: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            table_name: DEFAULT_TABLE_NAME.to_string(),
            preview_rows: 5,
            delimiter: ',',
            trim: false,
            categories_column: None,
            strict_labels: false,
        }
    }
}

impl PipelineConfig {
    /// Validate settings, mapping failures into the domain error
    pub fn check(&self) -> Result<()> {
        self.validate().map_err(|e| {
            AppError::ValidationError(format!("Invalid pipeline config: {}", e))
        })
    }

    /// Delimiter as the byte the CSV reader expects
    pub fn delimiter_byte(&self) -> u8 {
        // ASCII is enforced by validation
        self.delimiter as u8
    }
}

fn validate_delimiter(delimiter: &char) -> std::result::Result<(), ValidationError> {
    if delimiter.is_ascii() && !delimiter.is_ascii_alphanumeric() && *delimiter != '"' {
        Ok(())
    } else {
        Err(ValidationError::new("delimiter_not_ascii_punctuation"))
    }
}
