//! The closed set of pipeline stages and their fixed order.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One step of the display sequence. Variants are declared in pipeline
/// order, so the derived `Ord` is the transition order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Upload,
    Classify,
    Vectorize,
    Extract,
    Store,
    Complete,
}

impl Stage {
    /// Stages that have a runner, in execution order.
    pub const PROCESSING: [Stage; 5] = [
        Stage::Upload,
        Stage::Classify,
        Stage::Vectorize,
        Stage::Extract,
        Stage::Store,
    ];

    /// The stage that follows `self`, or `None` for the terminal stage.
    pub fn successor(self) -> Option<Stage> {
        match self {
            Stage::Upload => Some(Stage::Classify),
            Stage::Classify => Some(Stage::Vectorize),
            Stage::Vectorize => Some(Stage::Extract),
            Stage::Extract => Some(Stage::Store),
            Stage::Store => Some(Stage::Complete),
            Stage::Complete => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        self == Stage::Complete
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Upload => "upload",
            Stage::Classify => "classify",
            Stage::Vectorize => "vectorize",
            Stage::Extract => "extract",
            Stage::Store => "store",
            Stage::Complete => "complete",
        }
    }

    /// Badge label shown by the presentation layer.
    pub fn label(self) -> &'static str {
        match self {
            Stage::Upload => "Upload",
            Stage::Classify => "Classify",
            Stage::Vectorize => "Vectorize",
            Stage::Extract => "Extract",
            Stage::Store => "Store",
            Stage::Complete => "Complete",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStage(pub String);

impl fmt::Display for UnknownStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown stage '{}'", self.0)
    }
}

impl std::error::Error for UnknownStage {}

impl FromStr for Stage {
    type Err = UnknownStage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "upload" => Ok(Stage::Upload),
            "classify" => Ok(Stage::Classify),
            "vectorize" => Ok(Stage::Vectorize),
            "extract" => Ok(Stage::Extract),
            "store" => Ok(Stage::Store),
            "complete" => Ok(Stage::Complete),
            _ => Err(UnknownStage(s.to_string())),
        }
    }
}
