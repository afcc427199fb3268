use crate::charts::ChartOptions;
use crate::error::{ReportingError, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::warn;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub reporting: ReportingConfig,
    #[serde(default)]
    pub charts: ChartOptions,
}

#[derive(Debug, Deserialize)]
pub struct ReportingConfig {
    #[serde(default = "default_registry_dir")]
    pub registry_dir: String,
    /// Root directory that relative dataset paths resolve against.
    #[serde(default = "default_base_dir")]
    pub base_dir: String,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

fn default_registry_dir() -> String {
    "registry/datasets".to_string()
}

fn default_base_dir() -> String {
    ".".to_string()
}

fn default_output_dir() -> String {
    "output".to_string()
}

impl Default for ReportingConfig {
    fn default() -> Self {
        ReportingConfig {
            registry_dir: default_registry_dir(),
            base_dir: default_base_dir(),
            output_dir: default_output_dir(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            reporting: ReportingConfig::default(),
            charts: ChartOptions::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from("config.toml")
    }

    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let config_content = fs::read_to_string(path).map_err(|e| {
            ReportingError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let config: Config = toml::from_str(&config_content)?;
        Ok(config)
    }

    /// Load `config.toml`, falling back to built-in defaults when it is absent.
    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(config) => config,
            Err(e) => {
                warn!("Using default configuration: {}", e);
                Config::default()
            }
        }
    }
}
