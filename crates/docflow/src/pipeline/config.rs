use std::time::Duration;

use crate::config::Config;

pub struct PipelineConfig {
    pub upload_duration: Duration,
    pub classify_duration: Duration,
    pub vectorize_step: Duration,
    pub vectorize_settle: Duration,
    pub extract_duration: Duration,
    pub store_duration: Duration,
    pub transition_delay: Duration,
    pub watchdog_timeout: Duration,
    pub event_capacity: usize,
}

impl PipelineConfig {
    pub fn from_config(config: &Config) -> Self {
        let timing = &config.timing;
        Self {
            upload_duration: Duration::from_millis(timing.upload_ms),
            classify_duration: Duration::from_millis(timing.classify_ms),
            vectorize_step: Duration::from_millis(timing.vectorize_step_ms),
            vectorize_settle: Duration::from_millis(timing.vectorize_settle_ms),
            extract_duration: Duration::from_millis(timing.extract_ms),
            store_duration: Duration::from_millis(timing.store_ms),
            transition_delay: Duration::from_millis(timing.transition_delay_ms),
            watchdog_timeout: Duration::from_millis(timing.watchdog_ms),
            event_capacity: config.events.capacity,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}
