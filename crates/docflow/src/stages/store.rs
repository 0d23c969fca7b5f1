use std::time::Duration;

use async_trait::async_trait;

use crate::pipeline::error::PipelineError;
use crate::pipeline::stage::Stage;
use crate::stages::{StageContext, StageRunner};

/// Final stage. Nothing is persisted.
pub struct StoreRunner {
    duration: Duration,
}

impl StoreRunner {
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }
}

#[async_trait]
impl StageRunner for StoreRunner {
    fn stage(&self) -> Stage {
        Stage::Store
    }

    fn activity(&self) -> &'static str {
        "Storing results..."
    }

    fn duration(&self) -> Duration {
        self.duration
    }

    async fn run(&self, _ctx: &StageContext) -> Result<(), PipelineError> {
        tokio::time::sleep(self.duration).await;
        Ok(())
    }
}
