//! Plain-text rendering of the stage badges and result view.

use docflow::pipeline::ExtractionResult;
use docflow::Stage;

/// One line of badges: the active stage in brackets, completed stages
/// marked with a check, pending stages dimmed to plain text.
pub fn render_badges(current: Stage, completed: &[Stage]) -> String {
    Stage::PROCESSING
        .iter()
        .map(|stage| {
            if *stage == current {
                format!("[{}]", stage.label())
            } else if completed.contains(stage) {
                format!("{} \u{2713}", stage.label())
            } else {
                stage.label().to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("  ")
}

pub fn render_extraction(extraction: &ExtractionResult) -> Result<String, serde_json::Error> {
    let body = serde_json::to_string_pretty(extraction)?;
    Ok(format!("Extraction Complete\n{}", body))
}
