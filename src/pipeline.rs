//! Capture-and-classify pipeline.
//!
//! Linear state machine, no back-edges:
//!
//! capture -> persist -> infer -> classify -> record -> report
//!
//! Any stage failure before recording returns an error at the pipeline
//! boundary and appends nothing to the history. Reporting runs after the
//! history entry is written and can never roll it back: a report failure is
//! logged and swallowed. The caller owns the UI affordances and restores
//! them on every exit path (the run guard in `ui` drops regardless of
//! which stage failed).
//!
//! The pipeline exclusively owns one scratch workspace - a single capture
//! image and a single output directory - which is cleared at the start of
//! each run. Overlapping runs are not guarded against; the daemon's
//! single-threaded loop prevents overlap in practice.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};

use crate::classify::Verdict;
use crate::detect::InferenceBackend;
use crate::history::SessionHistory;
use crate::ingest::FrameSource;
use crate::report::Reporter;

/// Timestamp format recorded in history and sent to the reporting API.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const CAPTURE_FILE_NAME: &str = "captured_image.jpg";

/// Scratch filesystem area owned by the pipeline: one capture image and one
/// oracle output directory. Reset at the start of every run so artifacts
/// never accumulate across runs.
#[derive(Clone, Debug)]
pub struct Workspace {
    capture_path: PathBuf,
    output_dir: PathBuf,
}

impl Workspace {
    pub fn new(root: &Path) -> Self {
        Self {
            capture_path: root.join(CAPTURE_FILE_NAME),
            output_dir: root.join("runs").join("detect"),
        }
    }

    pub fn capture_path(&self) -> &Path {
        &self.capture_path
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Delete the previous run's output tree and recreate the directories.
    pub fn reset(&self) -> Result<()> {
        if self.output_dir.exists() {
            std::fs::remove_dir_all(&self.output_dir).with_context(|| {
                format!("clear previous output dir {}", self.output_dir.display())
            })?;
            log::debug!("cleared previous predictions in {}", self.output_dir.display());
        }
        std::fs::create_dir_all(&self.output_dir)
            .with_context(|| format!("create output dir {}", self.output_dir.display()))?;
        if let Some(parent) = self.capture_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create capture dir {}", parent.display()))?;
        }
        Ok(())
    }
}

/// Outcome of one successful run.
#[derive(Clone, Debug)]
pub struct RunReport {
    pub verdict: Verdict,
    pub timestamp: String,
    pub annotated_path: PathBuf,
}

/// How reports are dispatched after recording.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportMode {
    /// Detached thread; the pipeline does not await the outcome.
    Detached,
    /// In the calling thread. Used by `--once` runs (the process must not
    /// exit before the attempt) and by tests.
    Blocking,
}

/// The capture-and-classify pipeline.
pub struct InspectionPipeline {
    workspace: Workspace,
    oracle: Box<dyn InferenceBackend>,
    reporter: Arc<dyn Reporter>,
    conf_threshold: f32,
    report_mode: ReportMode,
}

impl InspectionPipeline {
    pub fn new(
        workspace: Workspace,
        oracle: Box<dyn InferenceBackend>,
        reporter: Arc<dyn Reporter>,
        conf_threshold: f32,
    ) -> Self {
        Self {
            workspace,
            oracle,
            reporter,
            conf_threshold,
            report_mode: ReportMode::Detached,
        }
    }

    pub fn with_report_mode(mut self, mode: ReportMode) -> Self {
        self.report_mode = mode;
        self
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Run one capture cycle.
    ///
    /// On success exactly one history entry has been appended and a report
    /// has been dispatched. On error nothing was recorded; the caller
    /// surfaces the error exactly once.
    pub fn run(
        &mut self,
        source: &mut dyn FrameSource,
        history: &mut SessionHistory,
    ) -> Result<RunReport> {
        // Capturing
        let frame = source
            .fetch_frame()
            .ok_or_else(|| anyhow!("failed to capture image from camera {}", source.describe()))?;

        // Persisting. Filesystem failures here abort the run like an oracle
        // failure would.
        self.workspace.reset()?;
        frame.save_jpeg(self.workspace.capture_path())?;
        drop(frame);

        // Inferring
        let oracle_name = self.oracle.name();
        let outcome = self
            .oracle
            .infer(
                self.workspace.capture_path(),
                self.conf_threshold,
                self.workspace.output_dir(),
            )
            .with_context(|| format!("oracle '{}' failed", oracle_name))?;

        // Classifying
        let verdict = Verdict::from_labels(&outcome.labels());
        log::info!(
            "classified {:?} from labels {:?}",
            verdict,
            outcome.labels()
        );

        // Recording
        let timestamp = chrono::Local::now().format(TIMESTAMP_FORMAT).to_string();
        history.append(timestamp.clone(), verdict);

        // Reporting, after the entry is recorded.
        self.dispatch_report(verdict, &outcome.annotated_path, &timestamp);

        Ok(RunReport {
            verdict,
            timestamp,
            annotated_path: outcome.annotated_path,
        })
    }

    fn dispatch_report(&self, verdict: Verdict, annotated_path: &Path, timestamp: &str) {
        let image = match std::fs::read(annotated_path) {
            Ok(bytes) => bytes,
            Err(e) => {
                log::warn!(
                    "skipping report: read annotated image {}: {}",
                    annotated_path.display(),
                    e
                );
                return;
            }
        };
        let verdict_text = verdict.to_string();
        let timestamp = timestamp.to_string();
        match self.report_mode {
            ReportMode::Blocking => self.reporter.report(&verdict_text, &image, &timestamp),
            ReportMode::Detached => {
                let reporter = Arc::clone(&self.reporter);
                std::thread::spawn(move || reporter.report(&verdict_text, &image, &timestamp));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_clears_previous_output_tree() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = Workspace::new(dir.path());
        workspace.reset().unwrap();

        let stale = workspace.output_dir().join("stale_prediction.jpg");
        std::fs::write(&stale, b"old").unwrap();
        assert!(stale.exists());

        workspace.reset().unwrap();
        assert!(!stale.exists());
        assert!(workspace.output_dir().exists());
    }

    #[test]
    fn capture_path_is_inside_workspace_root() {
        let workspace = Workspace::new(Path::new("scratch"));
        assert_eq!(
            workspace.capture_path(),
            Path::new("scratch/captured_image.jpg")
        );
        assert_eq!(workspace.output_dir(), Path::new("scratch/runs/detect"));
    }
}
