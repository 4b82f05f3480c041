// Stage registry for building stages by type name
use super::core::Stage;
use super::nodes::{MetadataTagStage, ValidationStage};
use crate::error::Result;
use serde_json::Value;
use std::collections::HashMap;

/// Factory function type for creating stages from their JSON options
pub type StageFactory = Box<dyn Fn(&Value) -> Result<Box<dyn Stage>> + Send + Sync>;

/// Type name of the built-in schema validation stage
pub const VALIDATE_STAGE: &str = "validate";

/// Type name of the built-in metadata tagging stage
pub const SET_METADATA_STAGE: &str = "set_metadata";

/// Registry for pipeline stages
pub struct StageRegistry {
    stages: HashMap<String, StageFactory>,
}

impl StageRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            stages: HashMap::new(),
        }
    }

    /// Registry with `validate` and `set_metadata` already registered
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(VALIDATE_STAGE, |options| {
            let stage: Box<dyn Stage> = Box::new(ValidationStage::from_options(options)?);
            Ok(stage)
        });
        registry.register(SET_METADATA_STAGE, |options| {
            let stage: Box<dyn Stage> = Box::new(MetadataTagStage::from_options(options)?);
            Ok(stage)
        });
        registry
    }

    /// Register a stage factory with a type name
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&Value) -> Result<Box<dyn Stage>> + Send + Sync + 'static,
    {
        self.stages.insert(name.into(), Box::new(factory));
    }

    /// Create a stage instance by type name, `None` if unregistered
    pub fn create(&self, name: &str, options: &Value) -> Option<Result<Box<dyn Stage>>> {
        self.stages.get(name).map(|factory| factory(options))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.stages.contains_key(name)
    }

    /// List all registered stage type names
    pub fn list_stages(&self) -> Vec<String> {
        self.stages.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

impl Default for StageRegistry {
    fn default() -> Self {
        Self::new()
    }
}
