//! Broadcasting of pipeline events for real-time streaming to a
//! presentation layer.

pub mod pipeline_events;

pub use pipeline_events::{PipelineEvent, PipelineEventBroadcaster, PipelineEventKind};
