use std::time::Duration;

use async_trait::async_trait;

use crate::pipeline::error::PipelineError;
use crate::pipeline::payload::{VectorizationResult, VECTOR_DIMENSIONS};
use crate::pipeline::stage::Stage;
use crate::stages::{StageContext, StageRunner};

/// Steps through [`VECTOR_DIMENSIONS`], publishing one payload per step,
/// then settles before completing.
pub struct VectorizeRunner {
    step: Duration,
    settle: Duration,
}

impl VectorizeRunner {
    pub fn new(step: Duration, settle: Duration) -> Self {
        Self { step, settle }
    }
}

#[async_trait]
impl StageRunner for VectorizeRunner {
    fn stage(&self) -> Stage {
        Stage::Vectorize
    }

    fn activity(&self) -> &'static str {
        "Generating vector embeddings..."
    }

    fn duration(&self) -> Duration {
        self.step
            .saturating_mul(VECTOR_DIMENSIONS.len() as u32)
            .saturating_add(self.settle)
    }

    async fn run(&self, ctx: &StageContext) -> Result<(), PipelineError> {
        for dim in VECTOR_DIMENSIONS {
            let value = VectorizationResult {
                dimensions: VECTOR_DIMENSIONS.to_vec(),
                current_dimension: dim,
            };
            ctx.publish_vectorization(value)?;
            log::trace!("Vector dimension {}", dim);
            tokio::time::sleep(self.step).await;
        }

        if ctx.is_superseded() {
            return Err(PipelineError::Superseded {
                stage: Stage::Vectorize,
            });
        }
        tokio::time::sleep(self.settle).await;
        Ok(())
    }
}
