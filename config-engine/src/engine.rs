use std::path::PathBuf;

use config::{Config, Environment, File};

use crate::error::{ConfigError, Result};
use crate::settings::PulseConfig;
use crate::validation;

pub const DEFAULT_ENV_PREFIX: &str = "PULSEIQ";

/// Builder over the `config` crate's layered sources
#[derive(Debug, Clone)]
pub struct ConfigEngine {
    file: Option<PathBuf>,
    file_required: bool,
    env_prefix: String,
}

impl Default for ConfigEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigEngine {
    pub fn new() -> Self {
        Self {
            file: None,
            file_required: false,
            env_prefix: DEFAULT_ENV_PREFIX.to_string(),
        }
    }

    /// Optional file; a missing file is skipped
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self.file_required = false;
        self
    }

    /// File that must exist
    pub fn with_required_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self.file_required = true;
        self
    }

    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Merge all sources, deserialize and validate
    pub fn load(&self) -> Result<PulseConfig> {
        let mut builder = Config::builder();

        if let Some(path) = &self.file {
            if self.file_required && !path.exists() {
                return Err(ConfigError::SourceNotFound(path.display().to_string()));
            }
            builder = builder.add_source(File::from(path.as_path()).required(self.file_required));
        }

        builder = builder.add_source(
            Environment::with_prefix(&self.env_prefix)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: PulseConfig = builder.build()?.try_deserialize()?;
        validation::validate(&config)?;

        tracing::debug!(
            backend = %config.backend.base_url,
            storage = %config.storage.path,
            "configuration loaded"
        );
        Ok(config)
    }
}
