use crate::domain::error::{AppError, Result};
use crate::domain::table::{Cell, ColumnType, Table};
use sqlx::{
    query::Query,
    sqlite::{SqliteArguments, SqliteConnectOptions, SqlitePool, SqlitePoolOptions},
    Sqlite, SqliteConnection,
};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Writes cleaned tables into a SQLite database file
pub struct SqliteSink {
    db_path: PathBuf,
}

impl SqliteSink {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }

    /// Drop `table_name` if present, recreate it from the table's columns and
    /// insert every row, all inside one transaction. Returns the inserted row count.
    ///
    /// The pool lives only for this call and is closed on every path.
    pub async fn replace_table(&self, table_name: &str, table: &Table) -> Result<u64> {
        if table.columns().is_empty() {
            return Err(AppError::ValidationError(format!(
                "Cannot create table '{}' without columns",
                table_name
            )));
        }

        let pool = connect(&self.db_path).await?;
        let result = write_table(&pool, table_name, table).await;
        pool.close().await;

        let inserted = result?;
        info!(table = table_name, rows = inserted, path = %self.db_path.display(), "Replaced table");
        Ok(inserted)
    }
}

/// Open a one-connection pool on the file itself; the path is never parsed as
/// a URL, so `?` and `#` in file names are kept literally.
async fn connect(db_path: &Path) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true);

    SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .map_err(|e| {
            AppError::DatabaseError(format!(
                "Failed to open database {}: {e}",
                db_path.display()
            ))
        })
}

async fn write_table(pool: &SqlitePool, table_name: &str, table: &Table) -> Result<u64> {
    let mut tx = pool
        .begin()
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to begin transaction: {}", e)))?;

    let quoted = quote_identifier(table_name);

    sqlx::query(&format!("DROP TABLE IF EXISTS {}", quoted))
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to drop table: {}", e)))?;

    let create_sql = create_table_sql(table_name, table);
    debug!(sql = %create_sql, "Creating table");
    sqlx::query(&create_sql)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to create table: {}", e)))?;

    let affected = insert_rows(&mut tx, table_name, table).await?;

    tx.commit()
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to commit transaction: {}", e)))?;

    Ok(affected)
}

async fn insert_rows(conn: &mut SqliteConnection, table_name: &str, table: &Table) -> Result<u64> {
    let placeholders = vec!["?"; table.columns().len()].join(", ");
    let insert_sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_identifier(table_name),
        table
            .columns()
            .iter()
            .map(|column| quote_identifier(column))
            .collect::<Vec<_>>()
            .join(", "),
        placeholders
    );

    let mut affected: u64 = 0;
    for (index, row) in table.rows().iter().enumerate() {
        let query = row
            .iter()
            .fold(sqlx::query(&insert_sql), |query, cell| bind_cell(query, cell));

        let res = query.execute(&mut *conn).await.map_err(|e| {
            AppError::DatabaseError(format!("Failed to insert row {}: {}", index, e))
        })?;
        affected += res.rows_affected();
    }

    Ok(affected)
}

fn bind_cell<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    cell: &'q Cell,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    match cell {
        Cell::Null => query.bind(None::<String>),
        Cell::Integer(value) => query.bind(*value),
        Cell::Real(value) => query.bind(*value),
        Cell::Text(value) => query.bind(value.as_str()),
    }
}

fn create_table_sql(table_name: &str, table: &Table) -> String {
    let columns: Vec<String> = table
        .columns()
        .iter()
        .enumerate()
        .map(|(idx, column)| {
            let column_type = table
                .column_type(idx)
                .unwrap_or_else(|| ColumnType::infer_cells(table.column_cells(idx)));
            format!("{} {}", quote_identifier(column), column_type.sql_type())
        })
        .collect();

    format!(
        "CREATE TABLE {} (\n    {}\n)",
        quote_identifier(table_name),
        columns.join(",\n    ")
    )
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
