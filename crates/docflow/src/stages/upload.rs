use std::time::Duration;

use async_trait::async_trait;

use crate::pipeline::error::PipelineError;
use crate::pipeline::stage::Stage;
use crate::stages::{StageContext, StageRunner};

/// Upload carries no payload; the selected file is never read.
pub struct UploadRunner {
    duration: Duration,
}

impl UploadRunner {
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }
}

#[async_trait]
impl StageRunner for UploadRunner {
    fn stage(&self) -> Stage {
        Stage::Upload
    }

    fn activity(&self) -> &'static str {
        "Uploading document..."
    }

    fn duration(&self) -> Duration {
        self.duration
    }

    async fn run(&self, _ctx: &StageContext) -> Result<(), PipelineError> {
        tokio::time::sleep(self.duration).await;
        Ok(())
    }
}
