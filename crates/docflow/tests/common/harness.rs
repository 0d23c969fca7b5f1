//! Test harness for isolated pipeline runs.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use tempfile::TempDir;
use tokio::sync::broadcast;

use docflow::config::{load_config, Config, TimingConfig};
use docflow::{Pipeline, PipelineConfig, PipelineEvent, PipelineEventBroadcaster};

/// Millisecond-scale timings so paused-clock tests stay readable.
pub fn fast_timing() -> TimingConfig {
    TimingConfig {
        upload_ms: 300,
        classify_ms: 330,
        vectorize_step_ms: 120,
        vectorize_settle_ms: 200,
        extract_ms: 400,
        store_ms: 510,
        transition_delay_ms: 0,
        watchdog_ms: 3000,
    }
}

pub struct TestHarness {
    /// Temporary directory holding config files written by the test.
    temp_dir: TempDir,
    pub config_dir: PathBuf,
    pub pipeline: Pipeline,
    pub broadcaster: PipelineEventBroadcaster,
    events: broadcast::Receiver<PipelineEvent>,
}

impl TestHarness {
    /// Harness using [`fast_timing`].
    pub fn new() -> Self {
        let config = Config {
            timing: fast_timing(),
            ..Config::default()
        };
        Self::with_config(config)
    }

    pub fn with_config(config: Config) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let config_dir = temp_dir.path().join("config");
        std::fs::create_dir_all(&config_dir).expect("Failed to create config dir");

        let pipeline_config = Arc::new(PipelineConfig::from_config(&config));
        let (pipeline, broadcaster) = Pipeline::with_broadcaster(pipeline_config);
        let events = broadcaster.subscribe();

        Self {
            temp_dir,
            config_dir,
            pipeline,
            broadcaster,
            events,
        }
    }

    /// Writes `json` as a config file and builds a harness from it.
    pub fn from_config_json(json: &str) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("config.json");
        std::fs::write(&path, json).expect("Failed to write config");
        let config = load_config(&path).expect("Config should load");
        Self::with_config(config)
    }

    /// Writes a config file into the harness config dir and returns its path.
    pub fn write_config(&self, name: &str, json: &str) -> PathBuf {
        let path = self.config_dir.join(name);
        std::fs::write(&path, json).expect("Failed to write config");
        path
    }

    /// All events received so far.
    pub fn drain_events(&mut self) -> Vec<PipelineEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }

    /// Waits for the next terminal event (completion, failure or reset).
    pub async fn next_terminal_event(&mut self) -> PipelineEvent {
        loop {
            let event = self.events.recv().await.expect("event channel closed");
            if event.is_terminal() {
                return event;
            }
        }
    }
}
