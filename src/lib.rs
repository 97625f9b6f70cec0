pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;

pub use crate::application::{ProcessDataRequest, ProcessDataSummary, ProcessDataUseCase};
pub use crate::interfaces::cli::{run_cli, CliCommand, USAGE};

use crate::infrastructure::config::ConfigService;
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Binary entry point: process arguments, print progress on stdout, log on stderr
pub fn run() {
    let _ = dotenvy::dotenv();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            error!(error = %err, "Failed to start runtime");
            std::process::exit(1);
        }
    };

    let config = ConfigService::new();
    let mut stdout = std::io::stdout();
    let result = runtime.block_on(run_cli(std::env::args_os().skip(1), &config, &mut stdout));

    if let Err(err) = result {
        error!(error = %err, "Failed to process data");
        std::process::exit(1);
    }
}
