//! Detection oracle.
//!
//! The pre-trained model is an external collaborator: this module only
//! defines its contract (`InferenceBackend`) and the two backends the
//! daemon ships with (an external-process oracle and a deterministic stub).

mod backend;
mod backends;
mod result;

use anyhow::Result;

pub use backend::InferenceBackend;
pub use backends::{ProcessBackend, StubBackend};
pub use result::{Detection, DetectionOutcome};

/// Select a backend from the configured detector command.
///
/// `stub://...` selects the deterministic stub oracle; anything else is
/// treated as an external command line.
pub fn backend_for_command(detector_cmd: &str) -> Result<Box<dyn InferenceBackend>> {
    if detector_cmd.starts_with("stub://") {
        Ok(Box::new(StubBackend::new()))
    } else {
        Ok(Box::new(ProcessBackend::new(detector_cmd)?))
    }
}
