// Built-in stages: schema validation and metadata tagging

use crate::error::{PipelineError, Result};
use crate::pipeline::{Envelope, SchemaRegistry, Stage};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Validation stage - checks required payload fields by (kind, version)
pub struct ValidationStage {
    schemas: SchemaRegistry,
}

#[derive(Deserialize)]
struct ValidationOptions {
    schemas: SchemaRegistry,
}

impl ValidationStage {
    pub fn new(schemas: SchemaRegistry) -> Self {
        Self { schemas }
    }

    /// Build from registry options: `{"schemas": {kind: {version: {...}}}}`
    pub fn from_options(options: &Value) -> Result<Self> {
        let options: ValidationOptions = serde_json::from_value(options.clone())?;
        Ok(Self::new(options.schemas))
    }

    pub fn schemas(&self) -> &SchemaRegistry {
        &self.schemas
    }
}

#[async_trait]
impl Stage for ValidationStage {
    fn name(&self) -> String {
        "Validation".to_string()
    }

    async fn process(&self, _cancel: &CancellationToken, envelope: Envelope) -> Result<Envelope> {
        let schema = self
            .schemas
            .lookup(&envelope.kind, &envelope.schema_version)
            .ok_or_else(|| PipelineError::SchemaNotFound {
                kind: envelope.kind.clone(),
                version: envelope.schema_version.clone(),
            })?;

        if let Some(field) = schema
            .required_fields
            .iter()
            .find(|field| !envelope.has_field(field))
        {
            return Err(PipelineError::MissingField {
                kind: envelope.kind.clone(),
                version: envelope.schema_version.clone(),
                field: field.clone(),
            });
        }

        debug!(
            "Envelope kind={} version={} passed validation",
            envelope.kind, envelope.schema_version
        );
        Ok(envelope)
    }
}

/// Metadata tag stage - sets one fixed metadata entry on every envelope
#[derive(Debug, Clone, Deserialize)]
pub struct MetadataTagStage {
    key: String,
    value: String,
}

impl MetadataTagStage {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Build from registry options: `{"key": ..., "value": ...}`
    pub fn from_options(options: &Value) -> Result<Self> {
        Ok(serde_json::from_value(options.clone())?)
    }
}

#[async_trait]
impl Stage for MetadataTagStage {
    fn name(&self) -> String {
        "MetadataTag".to_string()
    }

    async fn process(&self, _cancel: &CancellationToken, mut envelope: Envelope) -> Result<Envelope> {
        envelope.set_metadata(self.key.clone(), self.value.clone());
        Ok(envelope)
    }
}
