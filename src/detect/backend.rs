use std::path::Path;

use anyhow::Result;

use crate::detect::result::DetectionOutcome;

/// Detection oracle backend.
///
/// The oracle is external to this crate: implementations wrap a pre-trained
/// model and are relied on only for their input/output contract. An
/// implementation receives the persisted capture image, a confidence
/// threshold, and the run's output directory, and must:
/// - return every detection at or above the threshold
/// - write an annotated copy of the input image into `save_dir`
///
/// Implementations must not retain the image or write outside `save_dir`.
pub trait InferenceBackend: Send {
    /// Backend identifier for logs.
    fn name(&self) -> &'static str;

    /// Run detection on a saved image.
    fn infer(
        &mut self,
        image_path: &Path,
        conf_threshold: f32,
        save_dir: &Path,
    ) -> Result<DetectionOutcome>;
}
