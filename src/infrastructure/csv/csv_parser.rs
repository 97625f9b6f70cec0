// ============================================================
// CSV PARSER
// ============================================================
// Parse delimited text files into typed tables

use std::collections::HashSet;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use encoding_rs::WINDOWS_1252;
use tracing::{debug, warn};

use crate::domain::error::{AppError, Result};
use crate::domain::table::{Cell, ColumnType, Table};

/// CSV parser producing column-typed tables
pub struct CsvParser {
    /// Delimiter character (default: comma)
    delimiter: u8,

    /// Whether to trim whitespace from values
    trim: bool,
}

impl Default for CsvParser {
    fn default() -> Self {
        Self {
            delimiter: b',',
            trim: false,
        }
    }
}

impl CsvParser {
    /// Create a new CSV parser with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set custom delimiter
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set whether to trim whitespace
    pub fn with_trim(mut self, trim: bool) -> Self {
        self.trim = trim;
        self
    }

    /// Parse a CSV file into a table
    pub fn parse_file(&self, path: &Path) -> Result<Table> {
        let content = self.read_with_encoding_detection(path)?;

        self.parse_content(&content).map_err(|e| match e {
            AppError::ParseError(msg) => {
                AppError::ParseError(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })
    }

    /// Parse CSV content from string.
    ///
    /// Column types are inferred once every record has been read, so a single
    /// non-numeric value turns the whole column into text.
    pub fn parse_content(&self, content: &str) -> Result<Table> {
        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .trim(if self.trim { Trim::All } else { Trim::None })
            .flexible(true) // Short rows are padded below
            .from_reader(content.as_bytes());

        let headers = reader
            .headers()
            .map_err(|e| AppError::ParseError(format!("Failed to read CSV headers: {}", e)))?
            .clone();

        if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
            return Err(AppError::ParseError("CSV header row is empty".to_string()));
        }

        let mut records: Vec<StringRecord> = Vec::new();
        for (index, result) in reader.records().enumerate() {
            let record = result.map_err(|e| {
                AppError::ParseError(format!("Failed to parse CSV row {}: {}", index + 1, e))
            })?;

            if record.len() > headers.len() {
                return Err(AppError::ParseError(format!(
                    "CSV row {} has {} fields, header has {}",
                    index + 1,
                    record.len(),
                    headers.len()
                )));
            }
            records.push(record);
        }

        let column_types: Vec<ColumnType> = (0..headers.len())
            .map(|idx| ColumnType::infer_raw(records.iter().map(|r| r.get(idx).unwrap_or(""))))
            .collect();

        let mut table = Table::with_types(
            Self::unique_headers(&headers)
                .into_iter()
                .zip(column_types.iter().map(|column_type| Some(*column_type)))
                .collect(),
        );
        for record in &records {
            table.push_row(Self::parse_row(&column_types, record))?;
        }

        debug!(rows = table.len(), columns = table.columns().len(), "Parsed CSV content");
        Ok(table)
    }

    /// Read file as UTF-8, falling back to Windows-1252 for legacy exports
    fn read_with_encoding_detection(&self, path: &Path) -> Result<String> {
        let buffer = std::fs::read(path).map_err(|e| {
            AppError::IoError(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        match String::from_utf8(buffer) {
            Ok(content) => Ok(content),
            Err(err) => {
                warn!(path = %path.display(), "File is not valid UTF-8, decoding as Windows-1252");
                let (content, _, _) = WINDOWS_1252.decode(err.as_bytes());
                Ok(content.into_owned())
            }
        }
    }

    /// Rename repeated header names to `name.1`, `name.2`, ... so every column
    /// can be stored
    fn unique_headers(headers: &StringRecord) -> Vec<String> {
        let mut used: HashSet<String> = headers.iter().map(str::to_string).collect();
        let mut seen: HashSet<&str> = HashSet::new();
        let mut names = Vec::with_capacity(headers.len());

        for header in headers.iter() {
            if seen.insert(header) {
                names.push(header.to_string());
                continue;
            }
            let mut suffix = 1;
            let mut candidate = format!("{}.{}", header, suffix);
            while used.contains(&candidate) {
                suffix += 1;
                candidate = format!("{}.{}", header, suffix);
            }
            warn!(column = header, renamed = %candidate, "Renamed repeated CSV header");
            used.insert(candidate.clone());
            names.push(candidate);
        }

        names
    }

    /// Convert a single record into typed cells, padding short rows with nulls
    fn parse_row(column_types: &[ColumnType], record: &StringRecord) -> Vec<Cell> {
        column_types
            .iter()
            .enumerate()
            .map(|(idx, column_type)| match record.get(idx) {
                Some(value) => column_type.to_cell(value),
                None => Cell::Null,
            })
            .collect()
    }
}
