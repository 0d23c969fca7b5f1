use std::time::Duration;

use async_trait::async_trait;

use crate::pipeline::error::PipelineError;
use crate::pipeline::payload::ClassificationResult;
use crate::pipeline::stage::Stage;
use crate::stages::{StageContext, StageRunner};

pub struct ClassifyRunner {
    duration: Duration,
}

impl ClassifyRunner {
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }
}

#[async_trait]
impl StageRunner for ClassifyRunner {
    fn stage(&self) -> Stage {
        Stage::Classify
    }

    fn activity(&self) -> &'static str {
        "Classifying document..."
    }

    fn duration(&self) -> Duration {
        self.duration
    }

    async fn run(&self, ctx: &StageContext) -> Result<(), PipelineError> {
        let classification = ClassificationResult::placeholder();
        log::debug!(
            "Classified as '{}' ({:.0}% confidence)",
            classification.file_type,
            classification.confidence * 100.0
        );
        ctx.publish_classification(classification)?;

        tokio::time::sleep(self.duration).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::store::ResultStore;

    #[tokio::test(start_paused = true)]
    async fn test_publishes_before_waiting() {
        let store = ResultStore::new();
        let ctx = StageContext::new(store.invalidate(), store.clone());
        let runner = ClassifyRunner::new(Duration::from_millis(3300));

        let handle = tokio::spawn(async move { runner.run(&ctx).await });
        tokio::time::sleep(Duration::from_millis(1)).await;

        assert_eq!(store.classification(), Some(ClassificationResult::placeholder()));
        assert!(!handle.is_finished());

        handle.await.unwrap().unwrap();
    }
}
