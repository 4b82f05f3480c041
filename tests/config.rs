// Config loading and validation
mod common;

use common::temp_file;
use envpipe::config::{PipelineConfig, SinkKind};
use envpipe::error::ConfigError;

#[test]
fn test_config_defaults() {
    let path = temp_file("defaults.json", "{}");
    let config = PipelineConfig::load(&path).unwrap();

    assert_eq!(config.name, "envpipe");
    assert_eq!(config.channel_capacity, 1);
    assert!(config.stages.is_empty());
    assert_eq!(config.sink, SinkKind::Stdout);
    std::fs::remove_file(path).unwrap();
}

#[test]
fn test_config_full() {
    let path = temp_file(
        "full.json",
        r#"{
            "name": "users",
            "channel_capacity": 4,
            "sink": "memory",
            "stages": [
                {"type": "validate", "schemas": {"user.created": {"v1": {"required_fields": ["id"]}}}},
                {"type": "set_metadata", "key": "processed_by", "value": "cfg"}
            ]
        }"#,
    );
    let config = PipelineConfig::load(&path).unwrap();

    assert_eq!(config.name, "users");
    assert_eq!(config.channel_capacity, 4);
    assert_eq!(config.sink, SinkKind::Memory);
    assert_eq!(config.stages.len(), 2);
    assert_eq!(config.stages[0].stage_type, "validate");
    assert!(config.stages[0].options.contains_key("schemas"));
    assert!(!config.stages[1].options.contains_key("type"));
    assert_eq!(config.stages[1].options["value"], "cfg");
    std::fs::remove_file(path).unwrap();
}

#[test]
fn test_config_missing_file() {
    let err = PipelineConfig::load("/nonexistent/envpipe/pipeline.json").unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
}

#[test]
fn test_config_parse_error() {
    let path = temp_file("broken.json", "{ not json");
    let err = PipelineConfig::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
    std::fs::remove_file(path).unwrap();
}

#[test]
fn test_config_rejects_zero_capacity() {
    let path = temp_file("zero.json", r#"{"channel_capacity": 0}"#);
    let err = PipelineConfig::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
    std::fs::remove_file(path).unwrap();
}

#[test]
fn test_config_rejects_empty_stage_type() {
    let config: PipelineConfig =
        serde_json::from_str(r#"{"stages": [{"type": " "}]}"#).unwrap();
    let err = config.validate().unwrap_err();
    assert_eq!(err.to_string(), "Invalid configuration: stage #1 has an empty type");
}

#[test]
fn test_run_name_follows_command() {
    use clap::Parser;
    use envpipe::cli::Cli;

    let run = Cli::try_parse_from(["envpipe", "run", "events.jsonl", "-c", "conf/users.json"]).unwrap();
    assert_eq!(run.cmd.run_name(), "run-users");

    let defaulted = Cli::try_parse_from(["envpipe", "run", "events.jsonl"]).unwrap();
    assert_eq!(defaulted.cmd.run_name(), "run-pipeline");

    let demo = Cli::try_parse_from(["envpipe", "demo"]).unwrap();
    assert_eq!(demo.cmd.run_name(), "demo");
}
