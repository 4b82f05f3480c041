/// Centralized error handling for envpipe
pub mod config;
pub mod pipeline;

pub use config::{ConfigError, ConfigResult};
pub use pipeline::{PipelineError, Result};
