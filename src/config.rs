use crate::constants::*;
use crate::errors::{AppError, AppResult};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Resolved configuration with all values filled in (no Options).
///
/// This struct represents the run defaults and can be deserialized by the TOML
/// loader. All fields have concrete values, making it safe to access directly without unwrapping.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolvedConfig {
    /// Directory receiving the CSV and JSON output
    pub output_dir: PathBuf,
    /// Base of the portal's dataset metadata endpoint
    pub api_base_url: String,
    /// Timeout in seconds for a dataset metadata lookup
    pub metadata_timeout_secs: u64,
    /// Timeout in seconds for downloading a resource body
    pub resource_timeout_secs: u64,

    // Datasets
    /// District dataset slugs, tried in order until one yields a table
    pub district_datasets: Vec<String>,
    pub municipality_dataset: String,
    pub parish_dataset: String,

    /// `tracing` filter directive, e.g. `info` or `pt_geo_cli=debug`
    pub log_level: String,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            api_base_url: DATASETS_API_URL.to_string(),
            metadata_timeout_secs: 30,
            resource_timeout_secs: 60,
            district_datasets: DISTRICT_DATASETS.iter().map(|s| s.to_string()).collect(),
            municipality_dataset: MUNICIPALITY_DATASET.to_string(),
            parish_dataset: PARISH_DATASET.to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl ResolvedConfig {
    /// Loads and validates configuration from a TOML file.
    ///
    /// Every key is optional; missing keys take their defaults. Unknown keys are
    /// rejected so typos are not silently ignored.
    ///
    /// # Errors
    ///
    /// Returns `IoError` if the file cannot be read, and `InvalidInput` if the TOML
    /// is malformed, a timeout is zero, or a dataset slug is empty.
    pub fn from_toml_file(path: &Path) -> AppResult<Self> {
        let contents = fs::read_to_string(path)?;
        let config: ResolvedConfig = toml::from_str(&contents)
            .map_err(|e| AppError::InvalidInput(format!("Failed to parse config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> AppResult<()> {
        if self.metadata_timeout_secs == 0 || self.resource_timeout_secs == 0 {
            return Err(AppError::InvalidInput(
                "Timeouts must be greater than 0".into(),
            ));
        }
        let slugs = self
            .district_datasets
            .iter()
            .chain([&self.municipality_dataset, &self.parish_dataset]);
        for slug in slugs {
            if slug.trim().is_empty() {
                return Err(AppError::InvalidInput(
                    "Dataset slugs must not be empty".into(),
                ));
            }
        }
        Ok(())
    }

    pub fn metadata_timeout(&self) -> Duration {
        Duration::from_secs(self.metadata_timeout_secs)
    }

    pub fn resource_timeout(&self) -> Duration {
        Duration::from_secs(self.resource_timeout_secs)
    }
}
