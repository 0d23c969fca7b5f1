//! Placeholder payloads shown to the user as if they were analysis output.
//! None of them depend on the uploaded document.

use serde::{Deserialize, Serialize};

/// Dimensions the vectorize stage steps through, smallest first.
pub const VECTOR_DIMENSIONS: [u32; 4] = [3, 5, 20, 500];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult {
    pub file_type: String,
    pub tags: Vec<String>,
    pub summary: String,
    /// Always within `[0, 1]`.
    pub confidence: f32,
}

impl ClassificationResult {
    pub fn placeholder() -> Self {
        Self {
            file_type: "PDF Document".to_string(),
            tags: vec![
                "Government".to_string(),
                "Permit".to_string(),
                "Application".to_string(),
            ],
            summary: "Building permit application with supporting documents".to_string(),
            confidence: 0.97,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VectorizationResult {
    pub dimensions: Vec<u32>,
    pub current_dimension: u32,
}

impl VectorizationResult {
    /// Returns `None` unless `current` is one of [`VECTOR_DIMENSIONS`].
    pub fn at(current: u32) -> Option<Self> {
        VECTOR_DIMENSIONS.contains(&current).then(|| Self {
            dimensions: VECTOR_DIMENSIONS.to_vec(),
            current_dimension: current,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    pub title: String,
    pub author: String,
    pub date: String,
    pub category: String,
    pub keywords: Vec<String>,
    pub content_preview: String,
}

impl ExtractionResult {
    pub fn placeholder() -> Self {
        Self {
            title: "Building Permit Application".to_string(),
            author: "John Smith".to_string(),
            date: "2025-11-06".to_string(),
            category: "Construction".to_string(),
            keywords: ["permit", "building", "residential", "construction"]
                .iter()
                .map(|k| k.to_string())
                .collect(),
            content_preview: "Application for residential building permit...".to_string(),
        }
    }
}
