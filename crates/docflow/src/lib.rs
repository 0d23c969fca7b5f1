pub mod broadcast;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod stages;

pub use broadcast::{PipelineEvent, PipelineEventBroadcaster, PipelineEventKind};
pub use config::{load_config, load_config_or_default, Config};
pub use error::ConfigError;
pub use pipeline::{
    Pipeline, PipelineConfig, PipelineError, PipelineSnapshot, ResultStore, Stage, StageSequencer,
};
pub use stages::{StageContext, StageRegistry, StageRunner};
