use std::sync::{Arc, Mutex, MutexGuard};

use tokio::task::JoinHandle;
use tracing::{debug, info_span, Instrument};
use uuid::Uuid;

use crate::broadcast::PipelineEventBroadcaster;
use crate::stages::{StageContext, StageRegistry};

use super::config::PipelineConfig;
use super::error::PipelineError;
use super::progress::{BroadcastProgress, ProgressEvent, ProgressReporter};
use super::sequencer::{PipelineSnapshot, StageOutcome, StageSequencer};
use super::stage::Stage;
use super::store::{ResultStore, RunToken};

fn lock(sequencer: &Mutex<StageSequencer>) -> MutexGuard<'_, StageSequencer> {
    match sequencer.lock() {
        Ok(g) => g,
        Err(poisoned) => {
            log::warn!("Sequencer lock was poisoned, recovering");
            poisoned.into_inner()
        }
    }
}

/// Everything a run task needs. Progress is reported while the sequencer
/// lock is held so subscribers see events in state order.
#[derive(Clone)]
struct RunDriver {
    sequencer: Arc<Mutex<StageSequencer>>,
    stages: Arc<StageRegistry>,
    store: ResultStore,
    config: Arc<PipelineConfig>,
    progress: Arc<dyn ProgressReporter>,
}

impl RunDriver {
    async fn drive(self, token: RunToken, run_id: Uuid) {
        for stage in Stage::PROCESSING {
            let Some(runner) = self.stages.get(stage) else {
                self.fail(
                    token,
                    run_id,
                    PipelineError::StageFailed {
                        stage,
                        reason: "no runner registered".to_string(),
                    },
                );
                return;
            };

            {
                let seq = lock(&self.sequencer);
                if !seq.is_live(token) || seq.current_stage() != stage {
                    debug!(stage = %stage, "run no longer live, stopping");
                    return;
                }
                debug!(stage = %stage, nominal = ?runner.duration(), "stage started");
                self.progress.report(ProgressEvent::StageStarted {
                    run_id,
                    stage,
                    message: runner.activity().to_string(),
                });
            }

            let ctx = StageContext::new(token, self.store.clone());
            let timeout = self.config.watchdog_timeout;
            let result = tokio::time::timeout(timeout, runner.run(&ctx))
                .instrument(info_span!("stage", stage = %stage))
                .await
                .unwrap_or(Err(PipelineError::StageTimedOut { stage, timeout }));

            match result {
                Ok(()) => {}
                Err(PipelineError::Superseded { .. }) => {
                    debug!(stage = %stage, "stage superseded by a newer run");
                    return;
                }
                Err(e) => {
                    self.fail(token, run_id, e);
                    return;
                }
            }

            {
                let mut seq = lock(&self.sequencer);
                if !seq.is_live(token) {
                    return;
                }
                match seq.on_stage_complete(stage) {
                    StageOutcome::Ignored => return,
                    StageOutcome::Advanced(_) => {
                        self.progress.report(ProgressEvent::StageCompleted {
                            run_id,
                            stage,
                            completed: seq.run().completed_stages.clone(),
                        });
                    }
                    StageOutcome::Completed { results_visible } => {
                        let completed = seq.run().completed_stages.clone();
                        self.progress.report(ProgressEvent::StageCompleted {
                            run_id,
                            stage,
                            completed: completed.clone(),
                        });
                        self.progress.report(ProgressEvent::RunCompleted {
                            run_id,
                            completed,
                            results_visible,
                        });
                        return;
                    }
                }
            }

            if !self.config.transition_delay.is_zero() {
                tokio::time::sleep(self.config.transition_delay).await;
            }
        }
    }

    fn fail(&self, token: RunToken, run_id: Uuid, error: PipelineError) {
        let mut seq = lock(&self.sequencer);
        let stage = seq.current_stage();
        if seq.fail(token, &error) {
            self.progress.report(ProgressEvent::RunFailed {
                run_id,
                stage,
                error: error.to_string(),
            });
        }
    }
}

/// Async handle the presentation layer drives the pipeline through.
///
/// `start` spawns the run on the ambient tokio runtime, so it must be called
/// from within one.
pub struct Pipeline {
    driver: RunDriver,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl Pipeline {
    /// Production constructor: builds the default stage runners from config.
    pub fn from_config(config: Arc<PipelineConfig>, progress: Arc<dyn ProgressReporter>) -> Self {
        let stages = StageRegistry::new(&config);
        Self::new(config, stages, progress)
    }

    /// Constructor with injected stage runners.
    pub fn new(
        config: Arc<PipelineConfig>,
        stages: StageRegistry,
        progress: Arc<dyn ProgressReporter>,
    ) -> Self {
        let store = ResultStore::new();
        let sequencer = StageSequencer::new(store.clone());
        Self {
            driver: RunDriver {
                sequencer: Arc::new(Mutex::new(sequencer)),
                stages: Arc::new(stages),
                store,
                config,
                progress,
            },
            task: Mutex::new(None),
        }
    }

    /// Builds a pipeline that reports to a fresh broadcaster sized from config.
    pub fn with_broadcaster(config: Arc<PipelineConfig>) -> (Self, PipelineEventBroadcaster) {
        let broadcaster = PipelineEventBroadcaster::new(config.event_capacity);
        let progress = Arc::new(BroadcastProgress::new(broadcaster.clone()));
        (Self::from_config(config, progress), broadcaster)
    }

    fn task_slot(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        match self.task.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Starts a run for `file_name`. The file itself is never read.
    pub fn start(&self, file_name: &str) -> Result<RunToken, PipelineError> {
        let (token, run_id) = {
            let mut seq = lock(&self.driver.sequencer);
            let token = seq.start(file_name)?;
            let run_id = seq.run().run_id.unwrap_or_else(Uuid::new_v4);
            self.driver.progress.report(ProgressEvent::RunStarted {
                run_id,
                file_name: file_name.to_string(),
            });
            (token, run_id)
        };

        let span = info_span!("pipeline", run_id = %run_id, file_name = %file_name);
        let handle = tokio::spawn(self.driver.clone().drive(token, run_id).instrument(span));

        // A task from an earlier run is left to finish; its token is stale,
        // so it can no longer write payloads or advance the sequencer.
        self.task_slot().replace(handle);
        Ok(token)
    }

    /// Drops the current run, if any, along with all payloads. A pending
    /// stage timer of the dropped run can no longer affect state.
    pub fn reset(&self) {
        {
            let mut seq = lock(&self.driver.sequencer);
            let run_id = seq.run().run_id;
            seq.reset();
            self.driver
                .progress
                .report(ProgressEvent::RunReset { run_id });
        }
        if let Some(handle) = self.task_slot().take() {
            handle.abort();
        }
    }

    pub fn select_stage(&self, stage: Stage) -> Result<(), PipelineError> {
        lock(&self.driver.sequencer).select_stage(stage)
    }

    pub fn snapshot(&self) -> PipelineSnapshot {
        lock(&self.driver.sequencer).snapshot()
    }

    /// Read handle on the payload store.
    pub fn store(&self) -> ResultStore {
        self.driver.store.clone()
    }

    /// Waits for the current run task to finish. Returns immediately if no
    /// run was started or it was reset.
    pub async fn wait(&self) {
        let handle = self.task_slot().take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                if e.is_panic() {
                    log::error!("Pipeline run task panicked: {}", e);
                }
            }
        }
    }
}

impl Drop for Pipeline {
    fn drop(&mut self) {
        if let Some(handle) = self.task_slot().take() {
            handle.abort();
        }
    }
}
