// Pipeline builder for assembling stages from the registry
use super::core::Pipeline;
use super::registry::StageRegistry;
use crate::config::StageConfig;
use crate::error::{PipelineError, Result};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Builder for constructing pipelines with registered stages
pub struct PipelineBuilder {
    name: String,
    registry: Arc<StageRegistry>,
    stages: Vec<(String, Value)>,
}

impl PipelineBuilder {
    pub fn new(name: impl Into<String>, registry: Arc<StageRegistry>) -> Self {
        Self {
            name: name.into(),
            registry,
            stages: Vec::new(),
        }
    }

    /// Add a stage by type name with its options
    pub fn add_stage(mut self, stage_type: impl Into<String>, options: Value) -> Result<Self> {
        let stage_type = stage_type.into();
        if !self.registry.contains(&stage_type) {
            return Err(PipelineError::configuration_error(format!(
                "Stage '{}' not found in registry",
                stage_type
            )));
        }
        self.stages.push((stage_type, options));
        Ok(self)
    }

    /// Add every stage of a config section, in order
    pub fn add_stages<I>(mut self, stages: I) -> Result<Self>
    where
        I: IntoIterator<Item = StageConfig>,
    {
        for stage in stages {
            self = self.add_stage(stage.stage_type, Value::Object(stage.options))?;
        }
        Ok(self)
    }

    /// Build the pipeline; producer and consumer are attached by the caller
    pub fn build(self) -> Result<Pipeline> {
        let mut pipeline = Pipeline::new(self.name);

        for (stage_type, options) in &self.stages {
            let stage = self.registry.create(stage_type, options).ok_or_else(|| {
                PipelineError::configuration_error(format!("Stage '{}' not found", stage_type))
            })??;
            debug!("Created stage '{}' from type '{}'", stage.name(), stage_type);
            pipeline = pipeline.add_stage(stage);
        }

        Ok(pipeline)
    }
}
