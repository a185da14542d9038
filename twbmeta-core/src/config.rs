//! Configuration system for extraction and export

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main extractor configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractorConfig {
    #[serde(default)]
    pub global: GlobalConfig,
    #[serde(default)]
    pub translation: TranslationConfig,
}

impl ExtractorConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: ExtractorConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Validate values that serde cannot check on its own
    pub fn validate(&self) -> Result<()> {
        let delimiter = &self.global.delimiter;
        if delimiter.len() != 1 || !delimiter.is_ascii() {
            anyhow::bail!(
                "Configuration error: delimiter must be a single ASCII character, got '{}'",
                delimiter
            );
        }
        if delimiter == "\"" {
            anyhow::bail!("Configuration error: the quote character cannot be used as delimiter");
        }

        if self.translation.enabled {
            match self.translation.endpoint.as_deref() {
                Some(endpoint) if !endpoint.trim().is_empty() => {}
                _ => anyhow::bail!(
                    "Configuration error: translation is enabled but no endpoint is set"
                ),
            }
            if self.translation.timeout_seconds == 0 {
                anyhow::bail!("Configuration error: translation timeout_seconds must be positive");
            }
        }

        Ok(())
    }

    /// Delimiter as a byte, for the CSV writer
    pub fn delimiter(&self) -> u8 {
        self.global.delimiter.as_bytes().first().copied().unwrap_or(b',')
    }
}

/// Global extraction settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Field delimiter for exported tables
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
    /// Process batches and translations on the rayon thread pool
    #[serde(default = "default_parallel")]
    pub parallel: bool,
    /// Name workbooks after their file when no repository location is present
    #[serde(default)]
    pub workbook_name_from_file: bool,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            parallel: default_parallel(),
            workbook_name_from_file: false,
        }
    }
}

/// Settings of the formula translation service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Target expression language passed to the service
    #[serde(default = "default_target")]
    pub target: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: None,
            target: default_target(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

fn default_delimiter() -> String {
    ",".to_string()
}

fn default_parallel() -> bool {
    true
}

fn default_target() -> String {
    "DAX".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}
