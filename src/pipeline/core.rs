// Pipeline core - capability traits and the run engine

use super::envelope::Envelope;
use crate::error::{PipelineError, Result};
use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Receiving half of a started producer.
///
/// `errors` resolves at most once: with the producer's terminal failure, or
/// with a closed-channel error once the producer finished cleanly.
pub struct ProducerStreams {
    pub envelopes: mpsc::Receiver<Envelope>,
    pub errors: oneshot::Receiver<PipelineError>,
}

impl ProducerStreams {
    /// Create a connected sink/streams pair for a producer implementation
    pub fn channel(capacity: usize) -> (ProducerSink, ProducerStreams) {
        let (envelope_tx, envelope_rx) = mpsc::channel(capacity.max(1));
        let (error_tx, error_rx) = oneshot::channel();
        (
            ProducerSink {
                envelopes: envelope_tx,
                errors: error_tx,
            },
            ProducerStreams {
                envelopes: envelope_rx,
                errors: error_rx,
            },
        )
    }
}

/// Sending half owned by the producer's background task.
/// Dropping it completes both sequences.
pub struct ProducerSink {
    envelopes: mpsc::Sender<Envelope>,
    errors: oneshot::Sender<PipelineError>,
}

impl ProducerSink {
    /// Hand one envelope to the engine.
    ///
    /// Returns false once the run was cancelled or the engine stopped
    /// listening; the producer should stop emitting.
    pub async fn emit(&self, cancel: &CancellationToken, envelope: Envelope) -> bool {
        if cancel.is_cancelled() {
            return false;
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => false,
            sent = self.envelopes.send(envelope) => sent.is_ok(),
        }
    }

    /// Report the terminal failure and close both sequences
    pub fn fail(self, error: PipelineError) {
        if let Err(error) = self.errors.send(error) {
            debug!("Producer failure dropped, engine no longer listening: {}", error);
        }
    }
}

/// Source of envelopes.
///
/// `start` must not block: envelopes are produced by a background task that
/// stops when `cancel` fires or the streams are dropped.
pub trait Producer: Send + Sync {
    fn name(&self) -> String;

    fn start(&self, cancel: CancellationToken) -> ProducerStreams;
}

/// One processing step: validate or transform a single envelope
#[async_trait]
pub trait Stage: Send + Sync {
    fn name(&self) -> String;

    async fn process(&self, cancel: &CancellationToken, envelope: Envelope) -> Result<Envelope>;
}

/// Final destination of envelopes that survived every stage
#[async_trait]
pub trait Consumer: Send + Sync {
    fn name(&self) -> String;

    async fn consume(&self, cancel: &CancellationToken, envelope: Envelope) -> Result<()>;
}

/// Lifecycle of a single run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    NotStarted,
    Running,
    Completed,
    Aborted,
}

/// Outcome of a completed run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    /// Envelopes accepted by the consumer
    pub envelopes: usize,
}

/// Pipeline - wires producer -> ordered stages -> consumer
pub struct Pipeline {
    name: String,
    producer: Option<Box<dyn Producer>>,
    stages: Vec<Box<dyn Stage>>,
    consumer: Option<Box<dyn Consumer>>,
    state: RunState,
}

impl Pipeline {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            producer: None,
            stages: Vec::new(),
            consumer: None,
            state: RunState::NotStarted,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn with_producer(mut self, producer: Box<dyn Producer>) -> Self {
        self.producer = Some(producer);
        self
    }

    pub fn with_consumer(mut self, consumer: Box<dyn Consumer>) -> Self {
        self.consumer = Some(consumer);
        self
    }

    /// Append a stage; stages run in insertion order
    pub fn add_stage(mut self, stage: Box<dyn Stage>) -> Self {
        debug!("Adding stage '{}' to pipeline '{}'", stage.name(), self.name);
        self.stages.push(stage);
        self
    }

    pub fn stage_names(&self) -> Vec<String> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    /// Execute one run until the producer is drained or the first failure.
    pub async fn run(&mut self, cancel: &CancellationToken) -> Result<RunSummary> {
        if let Err(e) = self.check_ready(cancel) {
            warn!("Pipeline '{}' not started: {}", self.name, e);
            self.state = RunState::Aborted;
            return Err(e);
        }

        self.state = RunState::Running;
        info!(
            "Running pipeline '{}' with {} stages",
            self.name,
            self.stages.len()
        );

        let result = self.drive(cancel).await;
        match &result {
            Ok(summary) => {
                self.state = RunState::Completed;
                info!(
                    "Pipeline '{}' completed, {} envelopes delivered",
                    self.name, summary.envelopes
                );
            }
            Err(e) => {
                self.state = RunState::Aborted;
                warn!("Pipeline '{}' aborted: {}", self.name, e);
            }
        }
        result
    }

    fn check_ready(&self, cancel: &CancellationToken) -> Result<()> {
        if self.producer.is_none() {
            return Err(PipelineError::missing_producer());
        }
        if self.consumer.is_none() {
            return Err(PipelineError::missing_consumer());
        }
        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }
        Ok(())
    }

    async fn drive(&self, cancel: &CancellationToken) -> Result<RunSummary> {
        let producer = self
            .producer
            .as_ref()
            .ok_or_else(PipelineError::missing_producer)?;
        let consumer = self
            .consumer
            .as_ref()
            .ok_or_else(PipelineError::missing_consumer)?;

        // Stops the producer task however this function returns.
        let producer_token = cancel.child_token();
        let _producer_guard = producer_token.clone().drop_guard();

        debug!("Starting producer '{}'", producer.name());
        let ProducerStreams {
            mut envelopes,
            mut errors,
        } = producer.start(producer_token);

        let mut envelopes_open = true;
        let mut errors_open = true;
        let mut summary = RunSummary::default();

        while envelopes_open || errors_open {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    return Err(PipelineError::Cancelled);
                }
                notification = &mut errors, if errors_open => match notification {
                    Ok(error) => {
                        debug!("Producer '{}' reported failure", producer.name());
                        return Err(error);
                    }
                    Err(_) => {
                        debug!("Producer '{}' error channel closed", producer.name());
                        errors_open = false;
                    }
                },
                next = envelopes.recv(), if envelopes_open => match next {
                    Some(envelope) => {
                        let envelope = self.apply_stages(cancel, envelope).await?;

                        if cancel.is_cancelled() {
                            return Err(PipelineError::Cancelled);
                        }
                        consumer.consume(cancel, envelope).await?;
                        summary.envelopes += 1;
                    }
                    None => {
                        debug!("Producer '{}' envelope stream closed", producer.name());
                        envelopes_open = false;
                    }
                },
            }
        }

        Ok(summary)
    }

    async fn apply_stages(&self, cancel: &CancellationToken, envelope: Envelope) -> Result<Envelope> {
        debug!(
            "Processing envelope kind={} version={}",
            envelope.kind, envelope.schema_version
        );

        let mut current = envelope;
        for (index, stage) in self.stages.iter().enumerate() {
            if cancel.is_cancelled() {
                return Err(PipelineError::Cancelled);
            }

            debug!("Processing stage {}: '{}'", index + 1, stage.name());
            current = stage.process(cancel, current).await?;
        }
        Ok(current)
    }
}
