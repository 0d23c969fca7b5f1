pub mod classify;
pub mod extract;
pub mod store;
pub mod upload;
pub mod vectorize;

use std::time::Duration;

use async_trait::async_trait;

use crate::pipeline::error::PipelineError;
use crate::pipeline::payload::{ClassificationResult, ExtractionResult, VectorizationResult};
use crate::pipeline::stage::Stage;
use crate::pipeline::store::{ResultStore, RunToken};
use crate::pipeline::PipelineConfig;

pub use classify::ClassifyRunner;
pub use extract::ExtractRunner;
pub use store::StoreRunner;
pub use upload::UploadRunner;
pub use vectorize::VectorizeRunner;

/// Handle a runner uses to publish payloads for one run. Every write is
/// checked against the run token, so a runner from a reset run cannot touch
/// the store.
#[derive(Clone)]
pub struct StageContext {
    token: RunToken,
    store: ResultStore,
}

impl StageContext {
    pub fn new(token: RunToken, store: ResultStore) -> Self {
        Self { token, store }
    }

    pub fn is_superseded(&self) -> bool {
        !self.store.is_current(self.token)
    }

    pub fn publish_classification(&self, value: ClassificationResult) -> Result<(), PipelineError> {
        if self.store.publish_classification(self.token, value) {
            Ok(())
        } else {
            Err(PipelineError::Superseded {
                stage: Stage::Classify,
            })
        }
    }

    pub fn publish_vectorization(&self, value: VectorizationResult) -> Result<(), PipelineError> {
        if self.store.publish_vectorization(self.token, value) {
            Ok(())
        } else {
            Err(PipelineError::Superseded {
                stage: Stage::Vectorize,
            })
        }
    }

    pub fn publish_extraction(&self, value: ExtractionResult) -> Result<(), PipelineError> {
        if self.store.publish_extraction(self.token, value) {
            Ok(())
        } else {
            Err(PipelineError::Superseded {
                stage: Stage::Extract,
            })
        }
    }
}

/// One pipeline stage. `run` publishes the stage's payload (if it has one),
/// waits out the stage duration and returns; the driver turns the return
/// into the completion signal.
#[async_trait]
pub trait StageRunner: Send + Sync {
    fn stage(&self) -> Stage;

    /// Status line shown while the stage is active.
    fn activity(&self) -> &'static str;

    /// Nominal wall-clock length of the stage.
    fn duration(&self) -> Duration;

    async fn run(&self, ctx: &StageContext) -> Result<(), PipelineError>;
}

pub struct StageRegistry {
    runners: Vec<Box<dyn StageRunner>>,
}

impl StageRegistry {
    pub fn new(config: &PipelineConfig) -> Self {
        let runners: Vec<Box<dyn StageRunner>> = vec![
            Box::new(UploadRunner::new(config.upload_duration)),
            Box::new(ClassifyRunner::new(config.classify_duration)),
            Box::new(VectorizeRunner::new(
                config.vectorize_step,
                config.vectorize_settle,
            )),
            Box::new(ExtractRunner::new(config.extract_duration)),
            Box::new(StoreRunner::new(config.store_duration)),
        ];

        Self { runners }
    }

    /// Swaps in `runner` for the stage it reports.
    pub fn replace(&mut self, runner: Box<dyn StageRunner>) {
        let stage = runner.stage();
        self.runners.retain(|r| r.stage() != stage);
        self.runners.push(runner);
    }

    pub fn get(&self, stage: Stage) -> Option<&dyn StageRunner> {
        self.runners
            .iter()
            .find(|r| r.stage() == stage)
            .map(|r| r.as_ref())
    }
}
