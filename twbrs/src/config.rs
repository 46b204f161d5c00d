//! Configuration for workbook extraction

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::extractors::ExtractorKind;
use crate::metadata::{DEFAULT_CONTEXT, DEFAULT_DATASET_TYPE};

/// Main parser configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParserConfig {
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl ParserConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: ParserConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Check whether an extractor should run
    pub fn is_extractor_enabled(&self, kind: ExtractorKind) -> bool {
        !self.extraction.disabled_extractors.contains(kind.id())
    }

    /// Whether a top-level datasource is excluded from the summaries
    pub fn is_datasource_skipped(&self, name: &str) -> bool {
        self.extraction.skip_datasources.iter().any(|s| s == name)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        for id in &self.extraction.disabled_extractors {
            if ExtractorKind::from_id(id).is_none() {
                anyhow::bail!(
                    "Configuration error: Unknown extractor '{}' in disabled_extractors",
                    id
                );
            }
        }
        Ok(())
    }
}

/// `[extraction]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Extractors that should not run
    #[serde(default)]
    pub disabled_extractors: HashSet<String>,
    /// Extract worksheets, dashboards and stories on the rayon pool
    #[serde(default)]
    pub parallel: bool,
    /// Top-level datasources left out of the summaries
    #[serde(default = "default_skip_datasources")]
    pub skip_datasources: Vec<String>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            disabled_extractors: HashSet::new(),
            parallel: false,
            skip_datasources: default_skip_datasources(),
        }
    }
}

fn default_skip_datasources() -> Vec<String> {
    vec!["Parameters".to_string()]
}

/// `[output]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_context")]
    pub context: String,
    #[serde(default = "default_dataset_type")]
    pub dataset_type: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            context: default_context(),
            dataset_type: default_dataset_type(),
        }
    }
}

fn default_context() -> String {
    DEFAULT_CONTEXT.to_string()
}

fn default_dataset_type() -> String {
    DEFAULT_DATASET_TYPE.to_string()
}
