//! boxwatch - box condition inspection daemon.
//!
//! Captures a still image from a networked camera, runs an external
//! object-detection oracle over it, maps the detected labels to a condition
//! verdict, records the verdict in an in-process history, and forwards the
//! annotated result to a remote validation API.
//!
//! # Module Structure
//!
//! - `ingest`: frame sources (HTTP snapshot camera, stub)
//! - `detect`: oracle contract and backends (external process, stub)
//! - `classify`: label set -> verdict, fixed precedence (damaged wins)
//! - `pipeline`: capture -> persist -> infer -> classify -> record -> report
//! - `report`: fire-and-forget POST of `{Estado, Image, DataValidacao}`
//! - `history`: append-only session record
//! - `render`: explicit app state + pure projection to the terminal
//! - `config`: JSON file + env overrides

pub mod classify;
pub mod config;
pub mod detect;
pub mod frame;
pub mod history;
pub mod ingest;
pub mod pipeline;
pub mod render;
pub mod report;
pub mod ui;

pub use classify::{Verdict, LABEL_DAMAGED, LABEL_NORMAL};
pub use config::BoxwatchConfig;
pub use detect::{
    backend_for_command, Detection, DetectionOutcome, InferenceBackend, ProcessBackend,
    StubBackend,
};
pub use frame::CapturedFrame;
pub use history::{HistoryEntry, SessionHistory};
pub use ingest::{FrameSource, SnapshotConfig, SnapshotSource};
pub use pipeline::{
    InspectionPipeline, ReportMode, RunReport, Workspace, TIMESTAMP_FORMAT,
};
pub use render::{render, AppState, PreviewSummary};
pub use report::{HttpReporter, NullReporter, Reporter};
pub use ui::{Ui, UiMode};
