pub mod sink;
pub mod source;
pub mod stage;

pub use sink::{MemoryConsumer, StdoutConsumer};
pub use source::{JsonLinesProducer, SliceProducer};
pub use stage::{MetadataTagStage, ValidationStage};
