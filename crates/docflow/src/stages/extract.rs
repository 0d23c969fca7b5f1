use std::time::Duration;

use async_trait::async_trait;

use crate::pipeline::error::PipelineError;
use crate::pipeline::payload::ExtractionResult;
use crate::pipeline::stage::Stage;
use crate::stages::{StageContext, StageRunner};

pub struct ExtractRunner {
    duration: Duration,
}

impl ExtractRunner {
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }
}

#[async_trait]
impl StageRunner for ExtractRunner {
    fn stage(&self) -> Stage {
        Stage::Extract
    }

    fn activity(&self) -> &'static str {
        "Extracting structured data..."
    }

    fn duration(&self) -> Duration {
        self.duration
    }

    async fn run(&self, ctx: &StageContext) -> Result<(), PipelineError> {
        ctx.publish_extraction(ExtractionResult::placeholder())?;
        tokio::time::sleep(self.duration).await;
        Ok(())
    }
}
