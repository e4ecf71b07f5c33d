use std::path::Path;
use std::process::Command;

use anyhow::{anyhow, Context, Result};

use crate::detect::backend::InferenceBackend;
use crate::detect::result::{Detection, DetectionOutcome};

/// Oracle backend that shells out to an external detector.
///
/// The detector command is invoked once per capture as:
///
/// ```text
/// <cmd> [base args...] --source <image> --conf <threshold> --save-dir <dir>
/// ```
///
/// and must write an annotated copy of the input image (same file name) into
/// the save directory and print one JSON object per detection on stdout:
///
/// ```text
/// {"label": "destroyed_box", "confidence": 0.91}
/// ```
///
/// Blank stdout means no detections. A non-zero exit status or unparsable
/// output line is an oracle failure.
pub struct ProcessBackend {
    program: String,
    base_args: Vec<String>,
}

impl ProcessBackend {
    /// Build from a command line string, e.g. `"python detect.py --weights best.pt"`.
    pub fn new(command: &str) -> Result<Self> {
        let mut tokens = command.split_whitespace().map(str::to_string);
        let program = tokens
            .next()
            .ok_or_else(|| anyhow!("detector command is empty"))?;
        Ok(Self {
            program,
            base_args: tokens.collect(),
        })
    }
}

impl InferenceBackend for ProcessBackend {
    fn name(&self) -> &'static str {
        "process"
    }

    fn infer(
        &mut self,
        image_path: &Path,
        conf_threshold: f32,
        save_dir: &Path,
    ) -> Result<DetectionOutcome> {
        let output = Command::new(&self.program)
            .args(&self.base_args)
            .arg("--source")
            .arg(image_path)
            .arg("--conf")
            .arg(conf_threshold.to_string())
            .arg("--save-dir")
            .arg(save_dir)
            .output()
            .with_context(|| format!("spawn detector '{}'", self.program))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!(
                "detector '{}' exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            ));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let detections = parse_detections(&stdout)?;

        let file_name = image_path
            .file_name()
            .context("capture image path has no file name")?;
        let annotated_path = save_dir.join(file_name);

        Ok(DetectionOutcome {
            detections,
            annotated_path,
        })
    }
}

/// Parse detector stdout: one JSON object per non-empty line.
fn parse_detections(stdout: &str) -> Result<Vec<Detection>> {
    let mut detections = Vec::new();
    for line in stdout.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let detection: Detection = serde_json::from_str(line)
            .with_context(|| format!("unparsable detector output line: {}", line))?;
        detections.push(detection);
    }
    Ok(detections)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_one_detection_per_line() {
        let stdout = concat!(
            "{\"label\": \"normal_box\", \"confidence\": 0.72}\n",
            "\n",
            "{\"label\": \"destroyed_box\", \"confidence\": 0.45}\n",
        );
        let detections = parse_detections(stdout).unwrap();
        assert_eq!(detections.len(), 2);
        assert_eq!(detections[0].label, "normal_box");
        assert_eq!(detections[1].label, "destroyed_box");
    }

    #[test]
    fn empty_stdout_means_no_detections() {
        assert!(parse_detections("").unwrap().is_empty());
        assert!(parse_detections("\n\n").unwrap().is_empty());
    }

    #[test]
    fn garbage_line_is_an_error() {
        assert!(parse_detections("not json").is_err());
    }

    #[test]
    fn rejects_empty_command() {
        assert!(ProcessBackend::new("   ").is_err());
    }
}
