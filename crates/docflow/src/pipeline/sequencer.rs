//! Stage sequencer: the single authority for which stage is active and
//! which stages have completed in the current run.

use log::{debug, info, warn};
use serde::Serialize;
use uuid::Uuid;

use super::error::PipelineError;
use super::stage::Stage;
use super::store::{ResultStore, RunToken, StoredResults};

/// State of one run, as seen by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineRun {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    pub current_stage: Stage,
    /// Completion order, no duplicates.
    pub completed_stages: Vec<Stage>,
    pub is_running: bool,
    pub results_visible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Default for PipelineRun {
    fn default() -> Self {
        Self {
            run_id: None,
            file_name: None,
            current_stage: Stage::Upload,
            completed_stages: Vec::new(),
            is_running: false,
            results_visible: false,
            error: None,
        }
    }
}

/// Run state plus payloads, handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineSnapshot {
    #[serde(flatten)]
    pub run: PipelineRun,
    #[serde(flatten)]
    pub results: StoredResults,
}

/// What a completion signal did to the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageOutcome {
    /// Stale or duplicate signal; nothing changed.
    Ignored,
    /// The run moved on to the given stage.
    Advanced(Stage),
    /// The last stage finished and the run stopped.
    Completed { results_visible: bool },
}

pub struct StageSequencer {
    run: PipelineRun,
    token: RunToken,
    store: ResultStore,
}

impl StageSequencer {
    pub fn new(store: ResultStore) -> Self {
        let token = store.current_token();
        Self {
            run: PipelineRun::default(),
            token,
            store,
        }
    }

    pub fn run(&self) -> &PipelineRun {
        &self.run
    }

    pub fn store(&self) -> &ResultStore {
        &self.store
    }

    pub fn current_stage(&self) -> Stage {
        self.run.current_stage
    }

    pub fn token(&self) -> RunToken {
        self.token
    }

    /// True while `token` belongs to an active run.
    pub fn is_live(&self, token: RunToken) -> bool {
        self.run.is_running && self.token == token && self.store.is_current(token)
    }

    pub fn snapshot(&self) -> PipelineSnapshot {
        PipelineSnapshot {
            run: self.run.clone(),
            results: self.store.results(),
        }
    }

    /// Begins a new run at Upload. Rejected while a run is active.
    pub fn start(&mut self, file_name: &str) -> Result<RunToken, PipelineError> {
        if self.run.is_running {
            warn!("Ignoring start request: run already in progress");
            return Err(PipelineError::RunInProgress);
        }

        self.token = self.store.invalidate();
        let run_id = Uuid::new_v4();
        self.run = PipelineRun {
            run_id: Some(run_id),
            file_name: Some(file_name.to_string()),
            current_stage: Stage::Upload,
            completed_stages: Vec::new(),
            is_running: true,
            results_visible: false,
            error: None,
        };

        info!("Pipeline run {} started for '{}'", run_id, file_name);
        Ok(self.token)
    }

    /// Records that `stage` finished. Signals for any stage other than the
    /// current one, or arriving while no run is active, are ignored.
    pub fn on_stage_complete(&mut self, stage: Stage) -> StageOutcome {
        if !self.run.is_running || stage != self.run.current_stage {
            debug!(
                "Ignoring completion of '{}' (current '{}', running {})",
                stage, self.run.current_stage, self.run.is_running
            );
            return StageOutcome::Ignored;
        }
        if self.run.completed_stages.contains(&stage) {
            debug!("Ignoring duplicate completion of '{}'", stage);
            return StageOutcome::Ignored;
        }

        self.run.completed_stages.push(stage);

        match stage.successor() {
            Some(Stage::Complete) => {
                let results_visible = self.store.has_extraction();
                self.run.current_stage = Stage::Complete;
                self.run.is_running = false;
                self.run.results_visible = results_visible;
                info!(
                    "Pipeline run complete ({} stages, results visible: {})",
                    self.run.completed_stages.len(),
                    results_visible
                );
                StageOutcome::Completed { results_visible }
            }
            Some(next) => {
                self.run.current_stage = next;
                debug!("Stage '{}' complete, advancing to '{}'", stage, next);
                StageOutcome::Advanced(next)
            }
            // The current stage of a running pipeline is never Complete.
            None => StageOutcome::Ignored,
        }
    }

    /// Drops the run, its history and all payloads. Always legal.
    pub fn reset(&mut self) {
        self.token = self.store.invalidate();
        if self.run.is_running {
            info!("Pipeline run reset at stage '{}'", self.run.current_stage);
        }
        self.run = PipelineRun::default();
    }

    /// Changes the displayed stage without running it. Only allowed while idle.
    pub fn select_stage(&mut self, stage: Stage) -> Result<(), PipelineError> {
        if self.run.is_running {
            return Err(PipelineError::RunInProgress);
        }
        self.run.current_stage = stage;
        Ok(())
    }

    /// Stops the run for `token` and records `error`. Returns false if the
    /// token is stale.
    pub fn fail(&mut self, token: RunToken, error: &PipelineError) -> bool {
        if !self.is_live(token) {
            return false;
        }
        warn!(
            "Pipeline run stopped at stage '{}': {}",
            self.run.current_stage, error
        );
        self.run.is_running = false;
        self.run.results_visible = false;
        self.run.error = Some(error.to_string());
        true
    }
}
