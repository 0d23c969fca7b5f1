//! Pipeline event broadcaster for real-time stage streaming.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::pipeline::stage::Stage;

/// Kind of pipeline event.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PipelineEventKind {
    RunStarted,
    StageStarted,
    StageCompleted,
    RunCompleted,
    RunFailed,
    RunReset,
}

impl std::fmt::Display for PipelineEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineEventKind::RunStarted => write!(f, "Run started"),
            PipelineEventKind::StageStarted => write!(f, "Stage started"),
            PipelineEventKind::StageCompleted => write!(f, "Stage completed"),
            PipelineEventKind::RunCompleted => write!(f, "Run completed"),
            PipelineEventKind::RunFailed => write!(f, "Run failed"),
            PipelineEventKind::RunReset => write!(f, "Run reset"),
        }
    }
}

/// A single pipeline event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineEvent {
    /// Run this event belongs to. Absent for a reset of an idle pipeline.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<Uuid>,
    pub kind: PipelineEventKind,
    /// Stage the event refers to.
    pub stage: Stage,
    /// Human-readable message.
    pub message: String,
    pub timestamp: DateTime<Utc>,
    /// Completed stages after this event.
    #[serde(default)]
    pub completed_stages: Vec<Stage>,
    /// Set on run completion.
    #[serde(default)]
    pub results_visible: bool,
    /// Set on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PipelineEvent {
    pub fn new(run_id: Option<Uuid>, kind: PipelineEventKind, stage: Stage, message: &str) -> Self {
        Self {
            run_id,
            kind,
            stage,
            message: message.to_string(),
            timestamp: Utc::now(),
            completed_stages: vec![],
            results_visible: false,
            error: None,
        }
    }

    pub fn run_started(run_id: Uuid, file_name: &str) -> Self {
        Self::new(
            Some(run_id),
            PipelineEventKind::RunStarted,
            Stage::Upload,
            &format!("Processing '{}'", file_name),
        )
    }

    pub fn stage_started(run_id: Uuid, stage: Stage, message: &str) -> Self {
        Self::new(Some(run_id), PipelineEventKind::StageStarted, stage, message)
    }

    pub fn stage_completed(run_id: Uuid, stage: Stage, completed: &[Stage]) -> Self {
        let mut event = Self::new(
            Some(run_id),
            PipelineEventKind::StageCompleted,
            stage,
            &format!("{} complete", stage.label()),
        );
        event.completed_stages = completed.to_vec();
        event
    }

    pub fn run_completed(run_id: Uuid, completed: &[Stage], results_visible: bool) -> Self {
        let mut event = Self::new(
            Some(run_id),
            PipelineEventKind::RunCompleted,
            Stage::Complete,
            "Pipeline completed successfully",
        );
        event.completed_stages = completed.to_vec();
        event.results_visible = results_visible;
        event
    }

    pub fn run_failed(run_id: Uuid, stage: Stage, error: &str) -> Self {
        let mut event = Self::new(
            Some(run_id),
            PipelineEventKind::RunFailed,
            stage,
            "Pipeline failed",
        );
        event.error = Some(error.to_string());
        event
    }

    pub fn run_reset(run_id: Option<Uuid>) -> Self {
        Self::new(
            run_id,
            PipelineEventKind::RunReset,
            Stage::Upload,
            "Pipeline reset",
        )
    }

    /// True for the events that end a run.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.kind,
            PipelineEventKind::RunCompleted
                | PipelineEventKind::RunFailed
                | PipelineEventKind::RunReset
        )
    }
}

/// Broadcasts pipeline events to any number of subscribers.
#[derive(Clone)]
pub struct PipelineEventBroadcaster {
    sender: Arc<broadcast::Sender<PipelineEvent>>,
}

impl PipelineEventBroadcaster {
    /// Creates a broadcaster with the specified channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn send(&self, event: PipelineEvent) {
        // No active receivers is fine
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PipelineEvent> {
        self.sender.subscribe()
    }
}

impl Default for PipelineEventBroadcaster {
    fn default() -> Self {
        Self::new(100)
    }
}
