use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::pipeline::payload::VECTOR_DIMENSIONS;
use crate::pipeline::stage::Stage;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub version: String,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub events: EventsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            timing: TimingConfig::default(),
            events: EventsConfig::default(),
        }
    }
}

/// Stage durations in milliseconds. These stand in for animation lengths,
/// so zero is a legal value for every stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingConfig {
    #[serde(default = "default_upload_ms")]
    pub upload_ms: u64,
    #[serde(default = "default_classify_ms")]
    pub classify_ms: u64,
    #[serde(default = "default_vectorize_step_ms")]
    pub vectorize_step_ms: u64,
    #[serde(default = "default_vectorize_settle_ms")]
    pub vectorize_settle_ms: u64,
    #[serde(default = "default_extract_ms")]
    pub extract_ms: u64,
    #[serde(default = "default_store_ms")]
    pub store_ms: u64,
    #[serde(default)]
    pub transition_delay_ms: u64,
    #[serde(default = "default_watchdog_ms")]
    pub watchdog_ms: u64,
}

fn default_upload_ms() -> u64 {
    3000
}

fn default_classify_ms() -> u64 {
    3300
}

fn default_vectorize_step_ms() -> u64 {
    1200
}

fn default_vectorize_settle_ms() -> u64 {
    2000
}

fn default_extract_ms() -> u64 {
    4000
}

fn default_store_ms() -> u64 {
    5100
}

fn default_watchdog_ms() -> u64 {
    30_000
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            upload_ms: default_upload_ms(),
            classify_ms: default_classify_ms(),
            vectorize_step_ms: default_vectorize_step_ms(),
            vectorize_settle_ms: default_vectorize_settle_ms(),
            extract_ms: default_extract_ms(),
            store_ms: default_store_ms(),
            transition_delay_ms: 0,
            watchdog_ms: default_watchdog_ms(),
        }
    }
}

impl TimingConfig {
    /// Total length of each stage in milliseconds, or `None` if a total does
    /// not fit in a `u64`.
    pub fn stage_totals(&self) -> Option<[(Stage, u64); 5]> {
        let vectorize_ms = self
            .vectorize_step_ms
            .checked_mul(VECTOR_DIMENSIONS.len() as u64)?
            .checked_add(self.vectorize_settle_ms)?;
        Some([
            (Stage::Upload, self.upload_ms),
            (Stage::Classify, self.classify_ms),
            (Stage::Vectorize, vectorize_ms),
            (Stage::Extract, self.extract_ms),
            (Stage::Store, self.store_ms),
        ])
    }

    /// The watchdog must outlast every stage, otherwise each run fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let totals = self.stage_totals().ok_or_else(|| ConfigError::Validation {
            message: "vectorize stage duration overflows".to_string(),
        })?;

        for (stage, total_ms) in totals {
            if total_ms >= self.watchdog_ms {
                return Err(ConfigError::Validation {
                    message: format!(
                        "watchdogMs ({}) must exceed the {} stage duration ({} ms)",
                        self.watchdog_ms, stage, total_ms
                    ),
                });
            }
        }

        Ok(())
    }

    /// Divides every duration by `factor`. Rounding can shrink the watchdog
    /// below a stage total, so it is raised to stay above the longest stage.
    pub fn scaled(&self, factor: f64) -> Self {
        let scale = |ms: u64| ((ms as f64) / factor).round() as u64;
        let mut scaled = Self {
            upload_ms: scale(self.upload_ms),
            classify_ms: scale(self.classify_ms),
            vectorize_step_ms: scale(self.vectorize_step_ms),
            vectorize_settle_ms: scale(self.vectorize_settle_ms),
            extract_ms: scale(self.extract_ms),
            store_ms: scale(self.store_ms),
            transition_delay_ms: scale(self.transition_delay_ms),
            watchdog_ms: scale(self.watchdog_ms).max(1),
        };

        if let Some(longest) = scaled
            .stage_totals()
            .and_then(|totals| totals.iter().map(|(_, ms)| *ms).max())
        {
            scaled.watchdog_ms = scaled.watchdog_ms.max(longest.saturating_add(1));
        }

        scaled
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventsConfig {
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

fn default_capacity() -> usize {
    100
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
        }
    }
}
