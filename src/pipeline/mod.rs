// Pipeline module - envelope model, engine, and built-in strategies

pub mod builder;
pub mod core;
pub mod envelope;
pub mod nodes;
pub mod registry;

pub use crate::error::PipelineError;
pub use builder::PipelineBuilder;
pub use self::core::{
    Consumer, Pipeline, Producer, ProducerSink, ProducerStreams, RunState, RunSummary, Stage,
};
pub use envelope::{Envelope, Schema, SchemaRegistry};
pub use registry::{SET_METADATA_STAGE, StageFactory, StageRegistry, VALIDATE_STAGE};
