// ============================================================
// ENCODED CATEGORIES
// ============================================================
// Parsing of "label-0;label-1;..." strings into labels and indicators

use crate::domain::error::{AppError, Result};

/// Separator between `label-indicator` segments
pub const SEGMENT_SEPARATOR: char = ';';

/// Ordered label names taken from one encoded category string.
///
/// The labels of the first category record name the indicator columns of
/// every row. Later rows are only checked against them when strict checking
/// is requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryLabels {
    labels: Vec<String>,
}

impl CategoryLabels {
    /// Derive label names from the first row's encoded string
    pub fn from_encoded(encoded: &str) -> Result<Self> {
        let segments = split_segments(encoded, 0)?;
        let mut labels: Vec<String> = Vec::with_capacity(segments.len());

        for (position, segment) in segments.iter().enumerate() {
            let label = label_of(segment);
            if label.is_empty() {
                return Err(AppError::ValidationError(format!(
                    "Category segment {} ('{}') has no label name",
                    position, segment
                )));
            }
            if labels.iter().any(|existing| existing == label) {
                return Err(AppError::ValidationError(format!(
                    "Category label '{}' appears more than once",
                    label
                )));
            }
            labels.push(label.to_string());
        }

        Ok(Self { labels })
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Parse the indicator values of one encoded string.
    ///
    /// `row` is only used in error messages. With `strict` set, every segment
    /// label must match the label at the same position.
    pub fn indicators(&self, encoded: &str, row: usize, strict: bool) -> Result<Vec<i64>> {
        let segments = split_segments(encoded, row)?;
        if segments.len() != self.labels.len() {
            return Err(AppError::ParseError(format!(
                "Row {} has {} category segments, expected {}",
                row,
                segments.len(),
                self.labels.len()
            )));
        }

        segments
            .iter()
            .zip(&self.labels)
            .map(|(segment, label)| {
                if strict && label_of(segment) != label {
                    return Err(AppError::ValidationError(format!(
                        "Row {} has label '{}' where '{}' was expected",
                        row,
                        label_of(segment),
                        label
                    )));
                }
                indicator_of(segment, row)
            })
            .collect()
    }
}

fn split_segments(encoded: &str, row: usize) -> Result<Vec<&str>> {
    if encoded.is_empty() {
        return Err(AppError::ParseError(format!(
            "Row {} has an empty category string",
            row
        )));
    }
    Ok(encoded.split(SEGMENT_SEPARATOR).collect())
}

/// Segment without its trailing `-digit` suffix
fn label_of(segment: &str) -> &str {
    match segment.char_indices().rev().nth(1) {
        Some((idx, _)) => &segment[..idx],
        None => "",
    }
}

/// Numeric value of the segment's final character. No range check.
fn indicator_of(segment: &str, row: usize) -> Result<i64> {
    let last = segment.chars().last().ok_or_else(|| {
        AppError::ParseError(format!("Row {} has an empty category segment", row))
    })?;

    last.to_digit(10).map(i64::from).ok_or_else(|| {
        AppError::ParseError(format!(
            "Row {}: invalid indicator '{}' in category segment '{}'",
            row, last, segment
        ))
    })
}
