use std::path::Path;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};

use crate::classify::{LABEL_DAMAGED, LABEL_NORMAL};
use crate::detect::backend::InferenceBackend;
use crate::detect::result::{Detection, DetectionOutcome};

/// Stub oracle for testing and offline demos.
///
/// Derives a deterministic label set from a hash of the image bytes, so the
/// same capture always classifies the same way, and copies the input image
/// into the save directory as the "annotated" output.
pub struct StubBackend;

impl StubBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for StubBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl InferenceBackend for StubBackend {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn infer(
        &mut self,
        image_path: &Path,
        conf_threshold: f32,
        save_dir: &Path,
    ) -> Result<DetectionOutcome> {
        let bytes = std::fs::read(image_path)
            .with_context(|| format!("read capture image {}", image_path.display()))?;
        let hash: [u8; 32] = Sha256::digest(&bytes).into();

        // Confidence always clears the threshold so stub runs classify.
        let confidence = conf_threshold + (1.0 - conf_threshold) * (hash[1] as f32 / 255.0);
        let detections = match hash[0] % 4 {
            0 => vec![Detection {
                label: LABEL_NORMAL.to_string(),
                confidence,
            }],
            1 => vec![Detection {
                label: LABEL_DAMAGED.to_string(),
                confidence,
            }],
            2 => vec![
                Detection {
                    label: LABEL_NORMAL.to_string(),
                    confidence,
                },
                Detection {
                    label: LABEL_DAMAGED.to_string(),
                    confidence,
                },
            ],
            _ => vec![],
        };

        let file_name = image_path
            .file_name()
            .context("capture image path has no file name")?;
        let annotated_path = save_dir.join(file_name);
        // fs::copy truncates the source when source and destination are the
        // same file; a save_dir pointing at the capture's own directory must
        // not destroy the capture.
        if annotated_path != image_path {
            std::fs::copy(image_path, &annotated_path).with_context(|| {
                format!("copy annotated image to {}", annotated_path.display())
            })?;
        }

        Ok(DetectionOutcome {
            detections,
            annotated_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // The label set is picked by `sha256(bytes)[0] % 4`. These inputs were
    // chosen to land one in each branch:
    //   "camera frame 0002" -> 0 (normal), "box 1" -> 1 (damaged),
    //   "box 5" -> 2 (both), "box 2" -> 3 (nothing).
    fn oracle_run(content: &[u8]) -> DetectionOutcome {
        let dir = tempfile::tempdir().unwrap();
        let image_path = dir.path().join("captured_image.jpg");
        std::fs::write(&image_path, content).unwrap();
        let save_dir = dir.path().join("out");
        std::fs::create_dir_all(&save_dir).unwrap();

        let mut backend = StubBackend::new();
        backend.infer(&image_path, 0.25, &save_dir).unwrap()
    }

    #[test]
    fn same_image_yields_same_labels() {
        let dir = tempfile::tempdir().unwrap();
        let image_path = dir.path().join("captured_image.jpg");
        std::fs::write(&image_path, b"box 5").unwrap();
        let save_dir = dir.path().join("out");
        std::fs::create_dir_all(&save_dir).unwrap();

        let mut backend = StubBackend::new();
        let first = backend.infer(&image_path, 0.25, &save_dir).unwrap();
        let second = backend.infer(&image_path, 0.25, &save_dir).unwrap();

        assert_eq!(first.labels(), vec![LABEL_NORMAL, LABEL_DAMAGED]);
        assert_eq!(first.detections, second.detections);
        assert!(first.annotated_path.exists());
    }

    #[test]
    fn hash_branches_cover_every_label_set() {
        assert_eq!(oracle_run(b"camera frame 0002").labels(), vec![LABEL_NORMAL]);
        assert_eq!(oracle_run(b"box 1").labels(), vec![LABEL_DAMAGED]);
        assert_eq!(
            oracle_run(b"box 5").labels(),
            vec![LABEL_NORMAL, LABEL_DAMAGED]
        );
        assert!(oracle_run(b"box 2").labels().is_empty());
    }

    #[test]
    fn confidence_clears_threshold() {
        let outcome = oracle_run(b"camera frame 0002");
        assert!(!outcome.detections.is_empty());
        for detection in &outcome.detections {
            assert!(detection.confidence >= 0.25);
        }
    }

    #[test]
    fn save_dir_at_capture_dir_leaves_input_intact() {
        let dir = tempfile::tempdir().unwrap();
        let image_path = dir.path().join("captured_image.jpg");
        std::fs::write(&image_path, b"box 1").unwrap();

        // annotated_path == image_path here; the capture must survive.
        let mut backend = StubBackend::new();
        let first = backend.infer(&image_path, 0.25, dir.path()).unwrap();
        assert_eq!(std::fs::read(&image_path).unwrap(), b"box 1");

        let second = backend.infer(&image_path, 0.25, dir.path()).unwrap();
        assert_eq!(first.labels(), vec![LABEL_DAMAGED]);
        assert_eq!(first.detections, second.detections);
    }
}
