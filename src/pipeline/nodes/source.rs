// Producers: fixed in-memory list and JSON-lines file

use crate::config::constants::DEFAULT_CHANNEL_CAPACITY;
use crate::error::PipelineError;
use crate::pipeline::{Envelope, Producer, ProducerStreams};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Replays a fixed list of envelopes in insertion order
pub struct SliceProducer {
    envelopes: Arc<Vec<Envelope>>,
    capacity: usize,
}

impl SliceProducer {
    pub fn new(envelopes: Vec<Envelope>) -> Self {
        Self {
            envelopes: Arc::new(envelopes),
            capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }
}

impl Producer for SliceProducer {
    fn name(&self) -> String {
        "SliceProducer".to_string()
    }

    fn start(&self, cancel: CancellationToken) -> ProducerStreams {
        let (sink, streams) = ProducerStreams::channel(self.capacity);
        let envelopes = Arc::clone(&self.envelopes);

        tokio::spawn(async move {
            for envelope in envelopes.iter() {
                if !sink.emit(&cancel, envelope.clone()).await {
                    debug!("SliceProducer stopped early");
                    return;
                }
            }
            debug!("SliceProducer emitted {} envelopes", envelopes.len());
        });

        streams
    }
}

/// Reads one JSON envelope per non-empty line of a file.
///
/// A missing file or malformed line ends the stream with a terminal error.
pub struct JsonLinesProducer {
    path: PathBuf,
    capacity: usize,
}

impl JsonLinesProducer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }
}

impl Producer for JsonLinesProducer {
    fn name(&self) -> String {
        format!("JsonLinesProducer({})", self.path.display())
    }

    fn start(&self, cancel: CancellationToken) -> ProducerStreams {
        let (sink, streams) = ProducerStreams::channel(self.capacity);
        let path = self.path.clone();

        tokio::spawn(async move {
            let file = match File::open(&path).await {
                Ok(file) => file,
                Err(e) => {
                    sink.fail(PipelineError::Io(e));
                    return;
                }
            };

            let mut lines = BufReader::new(file).lines();
            let mut line_number = 0usize;
            loop {
                let line = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return,
                    line = lines.next_line() => line,
                };

                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => {
                        sink.fail(PipelineError::Io(e));
                        return;
                    }
                };
                line_number += 1;

                if line.trim().is_empty() {
                    continue;
                }

                let envelope = match serde_json::from_str::<Envelope>(&line) {
                    Ok(envelope) => envelope,
                    Err(e) => {
                        sink.fail(PipelineError::InvalidEnvelope {
                            line: line_number,
                            source: e,
                        });
                        return;
                    }
                };

                if !sink.emit(&cancel, envelope).await {
                    debug!("JsonLinesProducer stopped at line {}", line_number);
                    return;
                }
            }
            debug!("JsonLinesProducer read {} lines from {}", line_number, path.display());
        });

        streams
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_slice_producer_emits_all_envelopes_in_order() {
        let producer = SliceProducer::new(vec![
            Envelope::new("a", "v1"),
            Envelope::new("b", "v1"),
        ]);

        let ProducerStreams {
            mut envelopes,
            errors,
        } = producer.start(CancellationToken::new());

        let mut got = Vec::new();
        while let Some(envelope) = envelopes.recv().await {
            got.push(envelope.kind);
        }

        assert_eq!(got, vec!["a", "b"]);
        // Clean completion closes the error channel without a value
        assert!(errors.await.is_err());
    }

    #[tokio::test]
    async fn test_slice_producer_stops_on_cancel() {
        let producer = SliceProducer::new(vec![Envelope::new("a", "v1"); 16]);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let ProducerStreams {
            mut envelopes,
            errors,
        } = producer.start(cancel);

        assert!(envelopes.recv().await.is_none());
        assert!(errors.await.is_err());
    }
}
