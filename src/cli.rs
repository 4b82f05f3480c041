use crate::config::constants::{CONFIG_FILE, DEMO_TAG_KEY, DEMO_TAG_VALUE};
use crate::config::{PipelineConfig, SinkKind};
use crate::pipeline::nodes::{
    JsonLinesProducer, MemoryConsumer, MetadataTagStage, SliceProducer, StdoutConsumer,
    ValidationStage,
};
use crate::pipeline::{
    Consumer, Envelope, Pipeline, PipelineBuilder, RunSummary, Schema, SchemaRegistry,
    StageRegistry,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub type CommandResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

#[derive(Subcommand)]
#[command(version, about, long_about = None)]
pub enum Commands {
    /// Run a configured pipeline over a JSON-lines envelope file
    Run {
        /// Envelope file, one JSON envelope per line
        #[arg(required = true)]
        input: PathBuf,
        /// Pipeline config file
        #[clap(short, long, default_value = CONFIG_FILE)]
        config: PathBuf,
        /// Override the sink from the config file
        #[clap(short, long, value_enum)]
        sink: Option<SinkKind>,
    },

    /// Run the built-in two-envelope demo pipeline
    Demo {
        /// Sink receiving the processed envelopes
        #[clap(short, long, value_enum, default_value = "stdout")]
        sink: SinkKind,
    },
}

impl Commands {
    /// Short name of the run, used for its log file
    pub fn run_name(&self) -> String {
        match self {
            Commands::Run { config, .. } => {
                let stem = config
                    .file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
                    .unwrap_or_default();
                format!("run-{stem}")
            }
            Commands::Demo { .. } => "demo".to_string(),
        }
    }
}

/// envpipe Command
#[derive(Parser)]
#[command(about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,
}

/// Token cancelled on Ctrl-C
fn shutdown_token() -> CancellationToken {
    let token = CancellationToken::new();
    let signal_token = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling pipeline");
            signal_token.cancel();
        }
    });
    token
}

fn consumer_for(sink: SinkKind, memory: &MemoryConsumer) -> Box<dyn Consumer> {
    match sink {
        SinkKind::Stdout => Box::new(StdoutConsumer),
        SinkKind::Memory => Box::new(memory.clone()),
    }
}

async fn run_pipeline(
    mut pipeline: Pipeline,
    sink: SinkKind,
    memory: &MemoryConsumer,
) -> CommandResult<RunSummary> {
    let cancel = shutdown_token();
    let summary = pipeline.run(&cancel).await?;

    if sink == SinkKind::Memory {
        info!("Memory sink holds {} envelopes", memory.len().await);
    }
    Ok(summary)
}

pub async fn run_command(
    input: PathBuf,
    config_path: PathBuf,
    sink: Option<SinkKind>,
) -> CommandResult<RunSummary> {
    let config = PipelineConfig::load(&config_path)?;
    let sink = sink.unwrap_or(config.sink);
    let registry = Arc::new(StageRegistry::with_builtins());

    let producer = JsonLinesProducer::new(input).with_capacity(config.channel_capacity);
    let memory = MemoryConsumer::new();
    let pipeline = PipelineBuilder::new(config.name.clone(), registry)
        .add_stages(config.stages)?
        .build()?
        .with_producer(Box::new(producer))
        .with_consumer(consumer_for(sink, &memory));

    info!(
        "Pipeline '{}' stages: {:?}",
        pipeline.name(),
        pipeline.stage_names()
    );
    run_pipeline(pipeline, sink, &memory).await
}

pub async fn demo_command(sink: SinkKind) -> CommandResult<RunSummary> {
    let memory = MemoryConsumer::new();
    let pipeline = Pipeline::new("demo")
        .with_producer(Box::new(SliceProducer::new(demo_envelopes())))
        .add_stage(Box::new(ValidationStage::new(demo_schemas())))
        .add_stage(Box::new(MetadataTagStage::new(DEMO_TAG_KEY, DEMO_TAG_VALUE)))
        .with_consumer(consumer_for(sink, &memory));

    run_pipeline(pipeline, sink, &memory).await
}

pub fn demo_schemas() -> SchemaRegistry {
    SchemaRegistry::new()
        .with_schema("user.created", "v1", Schema::new(["id", "email"]))
        .with_schema("user.updated", "v1", Schema::new(["id", "email"]))
}

pub fn demo_envelopes() -> Vec<Envelope> {
    vec![
        Envelope::new("user.created", "v1")
            .with_field("id", "u_123")
            .with_field("email", "alice@example.com")
            .with_metadata("source", "demo"),
        Envelope::new("user.updated", "v1")
            .with_field("id", "u_123")
            .with_field("email", "alice+new@example.com")
            .with_metadata("source", "demo"),
    ]
}
