/// Pipeline run error types
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Pipeline configuration error: {0}")]
    ConfigurationError(String),

    #[error("Pipeline run cancelled")]
    Cancelled,

    #[error("schema not found: kind={kind:?} version={version:?}")]
    SchemaNotFound { kind: String, version: String },

    #[error("required payload field missing: {field} (kind={kind:?} version={version:?})")]
    MissingField {
        kind: String,
        version: String,
        field: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid envelope at line {line}: {source}")]
    InvalidEnvelope {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Node processing error: {0}")]
    NodeError(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl PipelineError {
    /// Create a new ConfigurationError
    pub fn configuration_error(msg: impl Into<String>) -> Self {
        Self::ConfigurationError(msg.into())
    }

    pub fn missing_producer() -> Self {
        Self::configuration_error("missing producer")
    }

    pub fn missing_consumer() -> Self {
        Self::configuration_error("missing consumer")
    }

    /// Wrap an arbitrary message as an opaque node failure
    pub fn node(msg: impl Into<String>) -> Self {
        Self::NodeError(msg.into().into())
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;
