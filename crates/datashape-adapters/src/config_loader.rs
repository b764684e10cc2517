//! Layered loading of [`DataConfig`].
//!
//! # Resolution order (highest priority first)
//!
//! 1. Environment variables (`DATASHAPE_MAX_DEPTH`,
//!    `DATASHAPE_NAME_MAPPING__INPUT__FROM`, ...)
//! 2. Config file (explicit path, or `<config dir>/datashape/config.toml`)
//! 3. Built-in defaults (always present)

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use datashape_core::config::DataConfig;
use thiserror::Error;
use tracing::{debug, instrument};

pub const ENV_PREFIX: &str = "DATASHAPE";

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("config file not found: {0}")]
    NotFound(PathBuf),

    #[error("invalid configuration: {0}")]
    Invalid(#[from] ConfigError),
}

/// Builder over the configuration layers.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    file: Option<PathBuf>,
    env_prefix: String,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self {
            file: None,
            env_prefix: ENV_PREFIX.to_string(),
        }
    }
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read this file instead of the default location. Unlike the default
    /// location, an explicit file must exist.
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    pub fn env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    #[instrument(skip(self), fields(file = ?self.file, prefix = %self.env_prefix))]
    pub fn load(&self) -> Result<DataConfig, ConfigLoadError> {
        let defaults = Config::try_from(&DataConfig::default())?;
        let mut builder = Config::builder().add_source(defaults);

        match &self.file {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigLoadError::NotFound(path.clone()));
                }
                builder = builder.add_source(File::from(path.as_path()).required(true));
            }
            None => {
                if let Some(path) = default_config_path() {
                    debug!(path = %path.display(), "Checking default config file");
                    builder = builder.add_source(File::from(path).required(false));
                }
            }
        }

        let config = builder
            .add_source(
                Environment::with_prefix(&self.env_prefix)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<DataConfig>()?;

        debug!(max_depth = config.max_depth, "Configuration loaded");
        Ok(config)
    }
}

/// Load from defaults, `path` (or the default file) and the environment.
pub fn load(path: Option<&Path>) -> Result<DataConfig, ConfigLoadError> {
    match path {
        Some(path) => ConfigLoader::new().file(path).load(),
        None => ConfigLoader::new().load(),
    }
}

/// `<config dir>/datashape/config.toml`, when the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("datashape").join("config.toml"))
}
