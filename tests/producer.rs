// JSON-lines producer against real files
mod common;

use common::temp_file;
use envpipe::error::PipelineError;
use envpipe::pipeline::nodes::{JsonLinesProducer, MemoryConsumer, MetadataTagStage};
use envpipe::pipeline::{Pipeline, Producer, ProducerStreams};
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn test_json_lines_run() {
    let path = temp_file(
        "events.jsonl",
        concat!(
            r#"{"kind": "user.created", "schema_version": "v1", "payload": {"id": "u_1"}}"#,
            "\n\n",
            r#"{"kind": "user.updated", "schema_version": "v1", "metadata": {"source": "file"}}"#,
            "\n",
        ),
    );
    let memory = MemoryConsumer::new();
    let mut pipeline = Pipeline::new("jsonl")
        .with_producer(Box::new(JsonLinesProducer::new(&path).with_capacity(2)))
        .add_stage(Box::new(MetadataTagStage::new("processed_by", "jsonl")))
        .with_consumer(Box::new(memory.clone()));

    let summary = pipeline.run(&CancellationToken::new()).await.unwrap();

    assert_eq!(summary.envelopes, 2);
    let stored = memory.envelopes().await;
    assert_eq!(stored[0].kind, "user.created");
    assert_eq!(stored[1].metadata_value("source"), Some("file"));
    assert_eq!(stored[1].metadata_value("processed_by"), Some("jsonl"));
    std::fs::remove_file(path).unwrap();
}

#[tokio::test]
async fn test_json_lines_malformed_line() {
    let path = temp_file(
        "broken.jsonl",
        concat!(
            "\n",
            r#"{"kind": "b"}"#,
            "\n",
            r#"{"kind": "a", "schema_version": "v1"}"#,
            "\n",
        ),
    );
    let memory = MemoryConsumer::new();
    let mut pipeline = Pipeline::new("jsonl-broken")
        .with_producer(Box::new(JsonLinesProducer::new(&path)))
        .with_consumer(Box::new(memory.clone()));

    let err = pipeline.run(&CancellationToken::new()).await.unwrap_err();

    assert!(matches!(err, PipelineError::InvalidEnvelope { line: 2, .. }));
    assert!(memory.is_empty().await);
    std::fs::remove_file(path).unwrap();
}

#[tokio::test]
async fn test_json_lines_missing_file() {
    let producer = JsonLinesProducer::new("/nonexistent/envpipe/events.jsonl");
    let ProducerStreams {
        mut envelopes,
        errors,
    } = producer.start(CancellationToken::new());

    let err = errors.await.unwrap();
    assert!(matches!(err, PipelineError::Io(_)));
    assert!(envelopes.recv().await.is_none());
}
