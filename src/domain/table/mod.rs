// ============================================================
// TABLE DOMAIN LAYER
// ============================================================
// Typed in-memory tables shared by the loader, expander, cleaner and sink
// No I/O, no async

mod cell;
mod data_table;

pub use cell::{Cell, ColumnType};
pub use data_table::{Table, TablePreview};
