use std::path::PathBuf;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use tracing::debug;

use crate::domain::error::{AppError, Result};
use crate::domain::pipeline_config::PipelineConfig;

/// Prefix of environment overrides, e.g. `PROCESS_DATA_TABLE_NAME`
pub const ENV_PREFIX: &str = "PROCESS_DATA_";
/// Variable naming an alternative settings file
pub const CONFIG_PATH_VAR: &str = "PROCESS_DATA_CONFIG";
const DEFAULT_CONFIG_FILE: &str = "process_data.toml";

pub struct ConfigService {
    config_path: PathBuf,
}

impl ConfigService {
    pub fn new() -> Self {
        let config_path = std::env::var_os(CONFIG_PATH_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        Self::with_path(config_path)
    }

    pub fn with_path(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    /// Layer defaults, the optional TOML file and environment overrides
    pub fn figment(&self) -> Figment {
        Figment::from(Serialized::defaults(PipelineConfig::default()))
            .merge(Toml::file(&self.config_path))
            .merge(Env::prefixed(ENV_PREFIX).ignore(&["config"]))
    }

    pub fn load(&self) -> Result<PipelineConfig> {
        let config: PipelineConfig = self.figment().extract().map_err(|e| {
            AppError::ConfigError(format!(
                "Failed to load settings from {}: {}",
                self.config_path.display(),
                e
            ))
        })?;

        config.check()?;
        debug!(?config, "Loaded pipeline config");
        Ok(config)
    }
}

impl Default for ConfigService {
    fn default() -> Self {
        Self::new()
    }
}
