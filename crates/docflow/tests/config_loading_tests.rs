//! Config loading from files on disk.

mod common;

use std::path::Path;

use common::TestHarness;
use docflow::config::{load_config, load_config_or_default};
use docflow::{ConfigError, PipelineConfig};

#[test]
fn loads_full_config_file() {
    let harness = TestHarness::new();
    let path = harness.write_config(
        "config.json",
        r#"{
            "version": "1.0",
            "timing": {
                "uploadMs": 1000,
                "classifyMs": 1100,
                "vectorizeStepMs": 400,
                "vectorizeSettleMs": 600,
                "extractMs": 1300,
                "storeMs": 1700,
                "transitionDelayMs": 250,
                "watchdogMs": 10000
            },
            "events": { "capacity": 16 }
        }"#,
    );

    let config = load_config(&path).unwrap();
    let pipeline = PipelineConfig::from_config(&config);

    assert_eq!(pipeline.upload_duration.as_millis(), 1000);
    assert_eq!(pipeline.vectorize_step.as_millis(), 400);
    assert_eq!(pipeline.transition_delay.as_millis(), 250);
    assert_eq!(pipeline.watchdog_timeout.as_millis(), 10_000);
    assert_eq!(pipeline.event_capacity, 16);
}

#[test]
fn partial_timing_keeps_defaults() {
    let harness = TestHarness::new();
    let path = harness.write_config(
        "partial.json",
        r#"{"version": "1.0", "timing": {"storeMs": 100}}"#,
    );

    let config = load_config(&path).unwrap();
    assert_eq!(config.timing.store_ms, 100);
    assert_eq!(config.timing.upload_ms, 3000);
    assert_eq!(config.timing.watchdog_ms, 30_000);
}

#[test]
fn zero_capacity_rejected() {
    let harness = TestHarness::new();
    let path = harness.write_config(
        "bad.json",
        r#"{"version": "1.0", "events": {"capacity": 0}}"#,
    );

    let err = load_config(&path).unwrap_err();
    assert!(matches!(err, ConfigError::SchemaValidation { .. }));
}

#[test]
fn negative_duration_rejected() {
    let harness = TestHarness::new();
    let path = harness.write_config(
        "bad.json",
        r#"{"version": "1.0", "timing": {"uploadMs": -5}}"#,
    );

    assert!(load_config(&path).is_err());
}

#[test]
fn explicit_path_wins_over_default_location() {
    let harness = TestHarness::new();
    let path = harness.write_config("explicit.json", r#"{"version": "1.0"}"#);

    let config = load_config_or_default(Some(path.as_path())).unwrap();
    assert_eq!(config.version, "1.0");
}

#[test]
fn missing_file_is_read_error() {
    let err = load_config(Path::new("/nonexistent/docflow/config.json")).unwrap_err();

    assert!(matches!(err, ConfigError::ReadFile { .. }));
    assert!(err.to_string().starts_with("Failed to read config file"));
}

#[test]
fn huge_vectorize_step_is_validation_error() {
    let harness = TestHarness::new();
    let path = harness.write_config(
        "huge.json",
        r#"{"version": "1.0", "timing": {"vectorizeStepMs": 9223372036854775807}}"#,
    );

    let err = load_config(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Validation { .. }));
}
