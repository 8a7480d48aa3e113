//! Configuration management for Strata storage components
//!
//! Centralized configuration with:
//! - YAML configuration files
//! - Environment variable overrides
//! - Reasonable defaults
//! - Configuration validation

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration structure for Strata
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct StrataConfig {
    #[serde(default)]
    pub deep_storage: DeepStorageConfig,

    #[serde(default)]
    pub archive: ArchiveConfig,
}

impl StrataConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Environment variables (highest priority)
    /// 2. Config file specified by STRATA_CONFIG env var
    /// 3. ./config/strata.yaml
    /// 4. /etc/strata/strata.yaml
    /// 5. Hardcoded defaults (lowest priority)
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        builder = Self::set_defaults(builder)?;

        if let Ok(config_path) = std::env::var("STRATA_CONFIG") {
            builder = builder.add_source(File::with_name(&config_path).required(false));
        }

        builder = builder
            .add_source(File::with_name("./config/strata").required(false))
            .add_source(File::with_name("/etc/strata/strata").required(false));

        // Override with environment variables
        // Example: STRATA_ARCHIVE__BUCKET=cold-archive
        builder = builder.add_source(
            Environment::with_prefix("STRATA")
                .separator("__")
                .try_parsing(true),
        );

        let config: StrataConfig = builder.build()?.try_deserialize()?;

        config.validate()?;

        Ok(config)
    }

    /// Set default values for all configuration options
    fn set_defaults(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        builder
            .set_default("deep_storage.bucket", "")?
            .set_default("deep_storage.base_key", "segments")?
            .set_default("archive.bucket", "")?
            .set_default("archive.base_key", "archived")
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        Self::validate_base_key("deep_storage.base_key", &self.deep_storage.base_key)?;
        Self::validate_base_key("archive.base_key", &self.archive.base_key)?;
        Ok(())
    }

    fn validate_base_key(name: &str, base_key: &str) -> Result<(), ConfigError> {
        if base_key.starts_with('/') || base_key.ends_with('/') {
            return Err(ConfigError::Message(format!(
                "{name} must not start or end with `/`"
            )));
        }
        Ok(())
    }

    /// Load configuration from a specific file path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config: StrataConfig = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()?
            .try_deserialize()?;

        config.validate()?;

        Ok(config)
    }
}

/// Naming convention for the live deep-storage location of segment objects.
///
/// `base_key` is the prefix under which default segment keys are constructed;
/// an empty string means segments live at the bucket root.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeepStorageConfig {
    pub bucket: String,
    pub base_key: String,
}

impl Default for DeepStorageConfig {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            base_key: "segments".to_string(),
        }
    }
}

/// Naming convention for the archive location of segment objects.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArchiveConfig {
    pub bucket: String,
    pub base_key: String,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            base_key: "archived".to_string(),
        }
    }
}
