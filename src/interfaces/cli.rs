// ============================================================
// COMMAND LINE INTERFACE
// ============================================================
// `process_data <messages_path> <categories_path> <database_path>`

use std::io::Write;
use std::path::PathBuf;

use tracing::info;

use crate::application::{ProcessDataRequest, ProcessDataUseCase};
use crate::domain::error::Result;
use crate::infrastructure::config::ConfigService;

pub const USAGE: &str = "Please provide the filepaths of the messages and categories \
datasets as the first and second argument respectively, as \
well as the filepath of the database to save the cleaned data \
to as the third argument. \n\nExample: process_data \
disaster_messages.csv disaster_categories.csv \
DisasterResponse.db";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    Run(ProcessDataRequest),
    Usage,
}

impl CliCommand {
    /// Interpret positional arguments, program name excluded
    pub fn parse<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<PathBuf>,
    {
        let mut args: Vec<PathBuf> = args.into_iter().map(Into::into).collect();
        if args.len() != 3 {
            return CliCommand::Usage;
        }

        let database_path = args.remove(2);
        let categories_path = args.remove(1);
        let messages_path = args.remove(0);

        CliCommand::Run(ProcessDataRequest {
            messages_path,
            categories_path,
            database_path,
        })
    }
}

/// Run the command described by `args`, printing to `out`.
/// Settings are only loaded once the argument count is valid.
pub async fn run_cli<I, S, W>(args: I, config: &ConfigService, out: &mut W) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: Into<PathBuf>,
    W: Write,
{
    match CliCommand::parse(args) {
        CliCommand::Usage => {
            writeln!(out, "{}", USAGE)?;
            Ok(())
        }
        CliCommand::Run(request) => {
            let use_case = ProcessDataUseCase::new(config.load()?);
            info!(table = %use_case.config().table_name, "Starting pipeline");
            use_case.execute(&request, out).await?;
            Ok(())
        }
    }
}
