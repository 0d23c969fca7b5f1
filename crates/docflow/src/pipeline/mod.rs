pub mod config;
pub mod error;
pub mod payload;
pub mod progress;
pub mod runner;
pub mod sequencer;
pub mod stage;
pub mod store;

pub use config::PipelineConfig;
pub use error::PipelineError;
pub use payload::{ClassificationResult, ExtractionResult, VectorizationResult, VECTOR_DIMENSIONS};
pub use progress::{BroadcastProgress, NoopProgress, ProgressEvent, ProgressReporter};
pub use runner::Pipeline;
pub use sequencer::{PipelineRun, PipelineSnapshot, StageOutcome, StageSequencer};
pub use stage::Stage;
pub use store::{ResultStore, RunToken, StoredResults};
