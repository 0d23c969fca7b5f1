//! End-to-end scenarios for the stage sequencer and its runners.

mod common;

use std::time::Duration;

use common::TestHarness;
use docflow::pipeline::payload::ExtractionResult;
use docflow::pipeline::StoredResults;
use docflow::{PipelineError, PipelineEventKind, Stage};

#[tokio::test(start_paused = true)]
async fn full_run_completes_every_stage() {
    let mut harness = TestHarness::new();

    harness.pipeline.start("permit.pdf").unwrap();
    let event = harness.next_terminal_event().await;

    assert_eq!(event.kind, PipelineEventKind::RunCompleted);
    assert!(event.results_visible);
    assert_eq!(event.completed_stages, Stage::PROCESSING.to_vec());

    let snapshot = harness.pipeline.snapshot();
    assert_eq!(snapshot.run.completed_stages, Stage::PROCESSING.to_vec());
    assert!(!snapshot.run.is_running);
    assert!(snapshot.run.results_visible);
    assert_eq!(snapshot.results.extraction, Some(ExtractionResult::placeholder()));
}

#[tokio::test(start_paused = true)]
async fn upload_completion_moves_to_classify() {
    let harness = TestHarness::new();

    harness.pipeline.start("permit.pdf").unwrap();
    // Upload takes 300ms.
    tokio::time::sleep(Duration::from_millis(310)).await;

    let snapshot = harness.pipeline.snapshot();
    assert_eq!(snapshot.run.current_stage, Stage::Classify);
    assert_eq!(snapshot.run.completed_stages, vec![Stage::Upload]);
    assert!(snapshot.run.is_running);
}

#[tokio::test(start_paused = true)]
async fn reset_before_upload_finishes_publishes_nothing() {
    let mut harness = TestHarness::new();
    let store = harness.pipeline.store();

    harness.pipeline.start("permit.pdf").unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    harness.pipeline.reset();

    // Well past the point a surviving run would have finished.
    tokio::time::sleep(Duration::from_secs(10)).await;

    assert_eq!(store.results(), StoredResults::default());
    let events = harness.drain_events();
    assert_eq!(events.last().unwrap().kind, PipelineEventKind::RunReset);
    assert!(events
        .iter()
        .all(|e| e.kind != PipelineEventKind::StageCompleted));
}

#[tokio::test(start_paused = true)]
async fn reset_after_completion_clears_results() {
    let mut harness = TestHarness::new();
    harness.pipeline.start("permit.pdf").unwrap();
    harness.next_terminal_event().await;

    harness.pipeline.reset();

    let snapshot = harness.pipeline.snapshot();
    assert!(snapshot.run.completed_stages.is_empty());
    assert!(!snapshot.run.is_running);
    assert!(!snapshot.run.results_visible);
    assert_eq!(snapshot.results, StoredResults::default());
}

#[tokio::test(start_paused = true)]
async fn restart_after_reset_runs_cleanly() {
    let mut harness = TestHarness::new();

    harness.pipeline.start("first.pdf").unwrap();
    tokio::time::sleep(Duration::from_millis(700)).await;
    harness.pipeline.reset();
    harness.pipeline.start("second.pdf").unwrap();

    let event = harness.next_terminal_event().await;
    // The reset event of the first run comes first.
    assert_eq!(event.kind, PipelineEventKind::RunReset);
    let event = harness.next_terminal_event().await;
    assert_eq!(event.kind, PipelineEventKind::RunCompleted);

    let snapshot = harness.pipeline.snapshot();
    assert_eq!(snapshot.run.file_name.as_deref(), Some("second.pdf"));
    assert_eq!(snapshot.run.completed_stages, Stage::PROCESSING.to_vec());
}

#[tokio::test(start_paused = true)]
async fn second_start_is_rejected_mid_run() {
    let harness = TestHarness::new();

    harness.pipeline.start("first.pdf").unwrap();
    tokio::time::sleep(Duration::from_millis(500)).await;
    let before = harness.pipeline.snapshot();

    assert_eq!(
        harness.pipeline.start("second.pdf"),
        Err(PipelineError::RunInProgress)
    );
    assert_eq!(harness.pipeline.snapshot(), before);
}

#[tokio::test(start_paused = true)]
async fn vectorize_payload_steps_through_dimensions() {
    let harness = TestHarness::new();
    let store = harness.pipeline.store();

    harness.pipeline.start("permit.pdf").unwrap();
    // Upload 300 + Classify 330; Vectorize publishes every 120ms from 630.
    tokio::time::sleep(Duration::from_millis(690)).await;
    assert_eq!(store.vectorization().unwrap().current_dimension, 3);
    tokio::time::sleep(Duration::from_millis(240)).await;
    assert_eq!(store.vectorization().unwrap().current_dimension, 20);

    harness.pipeline.wait().await;
    assert_eq!(store.vectorization().unwrap().current_dimension, 500);
}

#[tokio::test(start_paused = true)]
async fn config_file_timings_drive_run() {
    let mut harness = TestHarness::from_config_json(
        r#"{
            "version": "1.0",
            "timing": {
                "uploadMs": 10, "classifyMs": 10, "vectorizeStepMs": 1,
                "vectorizeSettleMs": 1, "extractMs": 10, "storeMs": 10,
                "transitionDelayMs": 5, "watchdogMs": 50
            }
        }"#,
    );

    let started = tokio::time::Instant::now();
    harness.pipeline.start("permit.pdf").unwrap();
    let event = harness.next_terminal_event().await;

    assert_eq!(event.kind, PipelineEventKind::RunCompleted);
    // 10 + 10 + (4 * 1 + 1) + 10 + 10 of stage time plus four transitions.
    assert_eq!(started.elapsed(), Duration::from_millis(65));
}
