use std::path::PathBuf;

use serde::Deserialize;

/// Result of one oracle invocation.
#[derive(Clone, Debug)]
pub struct DetectionOutcome {
    /// Labels detected above the confidence threshold.
    pub detections: Vec<Detection>,
    /// Annotated output image written by the oracle into the run's output
    /// directory. Valid until the next run resets the workspace.
    pub annotated_path: PathBuf,
}

impl DetectionOutcome {
    /// Detected label strings, in oracle order.
    pub fn labels(&self) -> Vec<&str> {
        self.detections
            .iter()
            .map(|detection| detection.label.as_str())
            .collect()
    }
}

/// One labeled detection. External oracles emit these as JSON lines.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Detection {
    pub label: String,
    #[serde(default)]
    pub confidence: f32,
}
