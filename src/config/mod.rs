//! Pipeline configuration loaded from JSON

pub mod constants;

use crate::error::{ConfigError, ConfigResult};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::Path;
use tracing::debug;

use constants::{DEFAULT_CHANNEL_CAPACITY, DEFAULT_PIPELINE_NAME};

/// Where delivered envelopes go
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    #[default]
    Stdout,
    Memory,
}

/// One entry of the `stages` list: `{"type": "...", ...options}`
#[derive(Debug, Clone, Deserialize)]
pub struct StageConfig {
    #[serde(rename = "type")]
    pub stage_type: String,
    #[serde(flatten)]
    pub options: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
    #[serde(default)]
    pub stages: Vec<StageConfig>,
    #[serde(default)]
    pub sink: SinkKind,
}

fn default_name() -> String {
    DEFAULT_PIPELINE_NAME.to_string()
}

fn default_channel_capacity() -> usize {
    DEFAULT_CHANNEL_CAPACITY
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            channel_capacity: default_channel_capacity(),
            stages: Vec::new(),
            sink: SinkKind::default(),
        }
    }
}

impl PipelineConfig {
    /// Read, parse and validate a config file
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;

        debug!(
            "Loaded pipeline config '{}' from {} with {} stages",
            config.name,
            path.display(),
            config.stages.len()
        );
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::invalid("pipeline name must not be empty"));
        }
        if self.channel_capacity == 0 {
            return Err(ConfigError::invalid("channel_capacity must be at least 1"));
        }
        if let Some(index) = self
            .stages
            .iter()
            .position(|stage| stage.stage_type.trim().is_empty())
        {
            return Err(ConfigError::invalid(format!(
                "stage #{} has an empty type",
                index + 1
            )));
        }
        Ok(())
    }
}
