//! Streaming envelope pipeline: a producer emits envelopes, an ordered chain
//! of stages validates and transforms each one, and a consumer receives the
//! result. A run is cancellable and stops at the first failure.

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod pipeline;

pub use error::{PipelineError, Result};
pub use pipeline::{Consumer, Envelope, Pipeline, Producer, Stage};
