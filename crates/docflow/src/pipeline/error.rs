use std::time::Duration;

use thiserror::Error;

use super::stage::Stage;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error("A pipeline run is already in progress")]
    RunInProgress,

    #[error("Stage '{stage}' did not complete within {timeout:?}")]
    StageTimedOut { stage: Stage, timeout: Duration },

    #[error("Stage '{stage}' failed: {reason}")]
    StageFailed { stage: Stage, reason: String },

    #[error("Stage '{stage}' belongs to a run that was reset or replaced")]
    Superseded { stage: Stage },
}
