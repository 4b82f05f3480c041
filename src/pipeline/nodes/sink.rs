// Consumers: stdout printer and in-memory store

use crate::error::Result;
use crate::pipeline::{Consumer, Envelope};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

/// Prints each envelope as one JSON line on stdout
pub struct StdoutConsumer;

#[async_trait]
impl Consumer for StdoutConsumer {
    fn name(&self) -> String {
        "StdoutConsumer".to_string()
    }

    async fn consume(&self, _cancel: &CancellationToken, envelope: Envelope) -> Result<()> {
        let mut line = serde_json::to_vec(&envelope)?;
        line.push(b'\n');

        let mut stdout = tokio::io::stdout();
        stdout.write_all(&line).await?;
        stdout.flush().await?;
        Ok(())
    }
}

/// Stores consumed envelopes in memory.
///
/// Clones share the same storage, so a handle kept by the caller observes
/// what the pipeline delivered.
#[derive(Clone, Default)]
pub struct MemoryConsumer {
    envelopes: Arc<Mutex<Vec<Envelope>>>,
}

impl MemoryConsumer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything stored so far
    pub async fn envelopes(&self) -> Vec<Envelope> {
        self.envelopes.lock().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.envelopes.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.envelopes.lock().await.is_empty()
    }
}

#[async_trait]
impl Consumer for MemoryConsumer {
    fn name(&self) -> String {
        "MemoryConsumer".to_string()
    }

    async fn consume(&self, _cancel: &CancellationToken, envelope: Envelope) -> Result<()> {
        self.envelopes.lock().await.push(envelope);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_consumer_shares_storage() {
        let consumer = MemoryConsumer::new();
        let handle = consumer.clone();
        let cancel = CancellationToken::new();

        consumer.consume(&cancel, Envelope::new("a", "v1")).await.unwrap();
        consumer.consume(&cancel, Envelope::new("b", "v1")).await.unwrap();

        assert_eq!(handle.len().await, 2);
        let kinds: Vec<_> = handle.envelopes().await.into_iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec!["a", "b"]);
    }
}
