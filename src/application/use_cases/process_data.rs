// ============================================================
// PROCESS DATA USE CASE
// ============================================================
// Load -> expand -> clean -> save, reporting progress as it goes

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::application::use_cases::category_expander::CategoryExpander;
use crate::application::use_cases::clean_data::DataCleaner;
use crate::application::use_cases::load_data::DataLoader;
use crate::domain::error::Result;
use crate::domain::pipeline_config::PipelineConfig;
use crate::domain::table::Table;
use crate::infrastructure::db::sqlite::SqliteSink;

/// Input and output locations of one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessDataRequest {
    pub messages_path: PathBuf,
    pub categories_path: PathBuf,
    pub database_path: PathBuf,
}

/// Row counts observed during a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessDataSummary {
    pub joined_rows: usize,
    pub duplicates_dropped: usize,
    pub saved_rows: u64,
}

pub struct ProcessDataUseCase {
    config: PipelineConfig,
}

impl ProcessDataUseCase {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Read both datasets, join them and expand the category column
    pub fn load_data(&self, messages_path: &Path, categories_path: &Path) -> Result<Table> {
        let loaded = DataLoader::new(&self.config).load(messages_path, categories_path)?;
        CategoryExpander::new(self.config.strict_labels).expand_loaded(loaded)
    }

    /// Remove exact duplicates; returns the number dropped
    pub fn clean_data(&self, table: &mut Table) -> usize {
        DataCleaner::drop_duplicates(table)
    }

    /// Replace the configured table in the database at `database_path`
    pub async fn save_data(&self, table: &Table, database_path: &Path) -> Result<u64> {
        SqliteSink::new(database_path)
            .replace_table(&self.config.table_name, table)
            .await
    }

    /// Run every step in order, writing progress lines and the preview to `out`
    pub async fn execute<W: Write>(
        &self,
        request: &ProcessDataRequest,
        out: &mut W,
    ) -> Result<ProcessDataSummary> {
        self.config.check()?;

        writeln!(
            out,
            "Loading data...\n    MESSAGES: {}\n    CATEGORIES: {}",
            request.messages_path.display(),
            request.categories_path.display()
        )?;
        let mut table = self.load_data(&request.messages_path, &request.categories_path)?;
        let joined_rows = table.len();

        writeln!(out, "Cleaning data...")?;
        let duplicates_dropped = self.clean_data(&mut table);
        writeln!(out, "{}", table.preview(self.config.preview_rows))?;

        writeln!(
            out,
            "Saving data...\n    DATABASE: {}",
            request.database_path.display()
        )?;
        let saved_rows = self.save_data(&table, &request.database_path).await?;

        writeln!(out, "Cleaned data saved to database!")?;

        let summary = ProcessDataSummary {
            joined_rows,
            duplicates_dropped,
            saved_rows,
        };
        info!(?summary, "Pipeline finished");
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::AppError;
    use crate::domain::table::Cell;
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePool};
    use sqlx::Row;

    const MESSAGES_CSV: &str = "\
id,message,original,genre
2,Weather update - a cold front from Cuba,Un front froid se retrouve sur Cuba,direct
7,Is the Hurricane over or is it not over,Cyclone nan fini osinon li pa fini,direct
8,Looking for someone but no name,,direct
7,Is the Hurricane over or is it not over,Cyclone nan fini osinon li pa fini,direct
";

    const CATEGORIES_CSV: &str = "\
id,categories
2,related-1;request-0;offer-0
7,related-1;request-0;offer-0
8,related-1;request-1;offer-0
";

    struct Fixture {
        dir: PathBuf,
    }

    impl Fixture {
        fn new(messages: &str, categories: &str) -> Self {
            let dir = std::env::temp_dir().join(format!("process-data-{}", uuid::Uuid::new_v4()));
            std::fs::create_dir_all(&dir).unwrap();
            std::fs::write(dir.join("messages.csv"), messages).unwrap();
            std::fs::write(dir.join("categories.csv"), categories).unwrap();
            Self { dir }
        }

        fn request(&self) -> ProcessDataRequest {
            ProcessDataRequest {
                messages_path: self.dir.join("messages.csv"),
                categories_path: self.dir.join("categories.csv"),
                database_path: self.dir.join("DisasterResponse.db"),
            }
        }
    }

    impl Drop for Fixture {
        fn drop(&mut self) {
            std::fs::remove_dir_all(&self.dir).ok();
        }
    }

    async fn open(path: &Path) -> SqlitePool {
        SqlitePool::connect_with(SqliteConnectOptions::new().filename(path))
            .await
            .unwrap()
    }

    async fn saved_rows(path: &Path) -> Vec<(i64, String, i64, i64, i64)> {
        let pool = open(path).await;
        let rows = sqlx::query_as(
            "SELECT id, genre, related, request, offer FROM twt_disaster_clean ORDER BY rowid",
        )
        .fetch_all(&pool)
        .await
        .unwrap();
        pool.close().await;
        rows
    }

    async fn saved_columns(path: &Path) -> Vec<(String, String)> {
        let pool = open(path).await;
        let columns = sqlx::query("PRAGMA table_info(\"twt_disaster_clean\")")
            .fetch_all(&pool)
            .await
            .unwrap()
            .iter()
            .map(|row| (row.get::<String, _>("name"), row.get::<String, _>("type")))
            .collect();
        pool.close().await;
        columns
    }

    fn column(name: &str, sql_type: &str) -> (String, String) {
        (name.to_string(), sql_type.to_string())
    }

    #[test]
    fn test_load_data_expands_categories() {
        let fixture = Fixture::new(
            "id,text\n1,help\n",
            "id,categories\n1,related-1;request-0\n",
        );
        let request = fixture.request();

        let table = ProcessDataUseCase::new(PipelineConfig::default())
            .load_data(&request.messages_path, &request.categories_path)
            .unwrap();

        assert_eq!(table.columns(), &["id", "text", "related", "request"]);
        assert_eq!(
            table.rows(),
            &[vec![
                Cell::Integer(1),
                Cell::Text("help".to_string()),
                Cell::Integer(1),
                Cell::Integer(0),
            ]]
        );
    }

    #[test]
    fn test_indicator_digit_is_not_clamped() {
        let fixture = Fixture::new("id,text\n1,help\n", "id,categories\n1,related-5\n");
        let request = fixture.request();

        let table = ProcessDataUseCase::new(PipelineConfig::default())
            .load_data(&request.messages_path, &request.categories_path)
            .unwrap();
        assert_eq!(table.rows()[0][2], Cell::Integer(5));
    }

    #[tokio::test]
    async fn test_execute_full_pipeline() {
        let fixture = Fixture::new(MESSAGES_CSV, CATEGORIES_CSV);
        let request = fixture.request();
        let use_case = ProcessDataUseCase::new(PipelineConfig::default());

        let mut out = Vec::<u8>::new();
        let summary = use_case.execute(&request, &mut out).await.unwrap();

        assert_eq!(summary.joined_rows, 4);
        assert_eq!(summary.duplicates_dropped, 1);
        assert_eq!(summary.saved_rows, 3);

        let output = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert!(lines[0].starts_with("Loading data..."));
        assert!(lines[1].starts_with("    MESSAGES: "));
        assert!(lines[2].starts_with("    CATEGORIES: "));
        assert_eq!(lines[3], "Cleaning data...");
        assert!(output.contains("Saving data...\n    DATABASE: "));
        assert!(output.ends_with("Cleaned data saved to database!\n"));

        assert_eq!(
            saved_rows(&request.database_path).await,
            vec![
                (2, "direct".to_string(), 1, 0, 0),
                (7, "direct".to_string(), 1, 0, 0),
                (8, "direct".to_string(), 1, 1, 0),
            ]
        );
    }

    #[tokio::test]
    async fn test_header_only_categories_still_create_table() {
        let fixture = Fixture::new("id,text\n1,help\n2,water\n", "id,categories\n");
        let request = fixture.request();
        let use_case = ProcessDataUseCase::new(PipelineConfig::default());

        let table = use_case
            .load_data(&request.messages_path, &request.categories_path)
            .unwrap();
        assert_eq!(table.columns(), &["id", "text"]);
        assert!(table.is_empty());

        let summary = use_case.execute(&request, &mut std::io::sink()).await.unwrap();
        assert_eq!(summary.joined_rows, 0);
        assert_eq!(summary.saved_rows, 0);
        assert_eq!(
            saved_columns(&request.database_path).await,
            vec![column("id", "INTEGER"), column("text", "TEXT")]
        );
    }

    #[tokio::test]
    async fn test_unmatched_ids_keep_integer_indicators() {
        let fixture = Fixture::new(
            "id,text\n1,help\n",
            "id,categories\n9,related-1;request-0\n",
        );
        let request = fixture.request();

        let summary = ProcessDataUseCase::new(PipelineConfig::default())
            .execute(&request, &mut std::io::sink())
            .await
            .unwrap();
        assert_eq!(summary.saved_rows, 0);
        assert_eq!(
            saved_columns(&request.database_path).await,
            vec![
                column("id", "INTEGER"),
                column("text", "TEXT"),
                column("related", "INTEGER"),
                column("request", "INTEGER"),
            ]
        );
    }

    #[tokio::test]
    async fn test_database_path_with_question_mark() {
        let fixture = Fixture::new(MESSAGES_CSV, CATEGORIES_CSV);
        let request = ProcessDataRequest {
            database_path: fixture.dir.join("out?v2.db"),
            ..fixture.request()
        };

        ProcessDataUseCase::new(PipelineConfig::default())
            .execute(&request, &mut std::io::sink())
            .await
            .unwrap();

        assert!(request.database_path.exists());
        assert_eq!(saved_rows(&request.database_path).await.len(), 3);
    }

    #[tokio::test]
    async fn test_rerun_replaces_table() {
        let fixture = Fixture::new(MESSAGES_CSV, CATEGORIES_CSV);
        let request = fixture.request();
        let use_case = ProcessDataUseCase::new(PipelineConfig::default());

        use_case.execute(&request, &mut std::io::sink()).await.unwrap();
        let first = saved_rows(&request.database_path).await;
        use_case.execute(&request, &mut std::io::sink()).await.unwrap();
        let second = saved_rows(&request.database_path).await;

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_transform_error_writes_nothing() {
        let fixture = Fixture::new("id,text\n1,help\n", "id,categories\n1,related-x\n");
        let request = fixture.request();

        let err = ProcessDataUseCase::new(PipelineConfig::default())
            .execute(&request, &mut std::io::sink())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::ParseError(_)));
        assert!(!request.database_path.exists());
    }

    #[tokio::test]
    async fn test_strict_labels_reject_reordered_rows() {
        let fixture = Fixture::new(
            "id,text\n1,a\n2,b\n",
            "id,categories\n1,related-1;request-0\n2,request-1;related-0\n",
        );
        let request = fixture.request();
        let config = PipelineConfig {
            strict_labels: true,
            ..Default::default()
        };

        let err = ProcessDataUseCase::new(config)
            .execute(&request, &mut std::io::sink())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
        assert!(!request.database_path.exists());
    }
}
