use uuid::Uuid;

use crate::broadcast::pipeline_events::{PipelineEvent, PipelineEventBroadcaster};

use super::stage::Stage;

/// Events emitted by the pipeline driver during a run.
pub enum ProgressEvent {
    RunStarted {
        run_id: Uuid,
        file_name: String,
    },
    StageStarted {
        run_id: Uuid,
        stage: Stage,
        message: String,
    },
    StageCompleted {
        run_id: Uuid,
        stage: Stage,
        completed: Vec<Stage>,
    },
    RunCompleted {
        run_id: Uuid,
        completed: Vec<Stage>,
        results_visible: bool,
    },
    RunFailed {
        run_id: Uuid,
        stage: Stage,
        error: String,
    },
    RunReset {
        run_id: Option<Uuid>,
    },
}

pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

/// No-op reporter for unit tests.
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
    fn report(&self, _event: ProgressEvent) {}
}

/// Bridges pipeline progress to the broadcast channel.
pub struct BroadcastProgress {
    broadcaster: PipelineEventBroadcaster,
}

impl BroadcastProgress {
    pub fn new(broadcaster: PipelineEventBroadcaster) -> Self {
        Self { broadcaster }
    }

}

impl ProgressReporter for BroadcastProgress {
    fn report(&self, event: ProgressEvent) {
        let event = match event {
            ProgressEvent::RunStarted { run_id, file_name } => {
                PipelineEvent::run_started(run_id, &file_name)
            }
            ProgressEvent::StageStarted {
                run_id,
                stage,
                message,
            } => PipelineEvent::stage_started(run_id, stage, &message),
            ProgressEvent::StageCompleted {
                run_id,
                stage,
                completed,
            } => PipelineEvent::stage_completed(run_id, stage, &completed),
            ProgressEvent::RunCompleted {
                run_id,
                completed,
                results_visible,
            } => PipelineEvent::run_completed(run_id, &completed, results_visible),
            ProgressEvent::RunFailed {
                run_id,
                stage,
                error,
            } => PipelineEvent::run_failed(run_id, stage, &error),
            ProgressEvent::RunReset { run_id } => PipelineEvent::run_reset(run_id),
        };
        self.broadcaster.send(event);
    }
}
