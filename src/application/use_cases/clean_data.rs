// ============================================================
// DATA CLEANER
// ============================================================
// Drop rows that repeat an earlier row across every column

use std::collections::HashSet;

use tracing::info;

use crate::domain::table::{Cell, Table};

pub struct DataCleaner;

impl DataCleaner {
    /// Keep the first occurrence of every distinct row, in original order.
    /// Returns how many rows were dropped.
    pub fn drop_duplicates(table: &mut Table) -> usize {
        let before = table.len();

        let keep: Vec<bool> = {
            let mut seen: HashSet<&[Cell]> = HashSet::with_capacity(before);
            table.rows().iter().map(|row| seen.insert(row.as_slice())).collect()
        };

        let mut flags = keep.into_iter();
        table.retain_rows(|_| flags.next().unwrap_or(true));

        let dropped = before - table.len();
        info!(dropped, remaining = table.len(), "Removed duplicate rows");
        dropped
    }
}
