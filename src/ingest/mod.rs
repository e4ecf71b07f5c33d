//! Frame ingestion.
//!
//! A frame source produces one `CapturedFrame` per call. The snapshot source
//! talks HTTP to a networked still camera; a `stub://` URL selects a
//! synthetic source for tests and offline demos.
//!
//! Fetching never propagates an error to the caller: transport failures,
//! non-success statuses, and decode failures log the cause and yield `None`.
//! There is no retry and no shared connection state between calls. The
//! capture pipeline and the presentation loop each call the source
//! independently.

mod snapshot;

pub use snapshot::{SnapshotConfig, SnapshotSource};

use crate::frame::CapturedFrame;

/// Source of still frames.
pub trait FrameSource: Send {
    /// Fetch one frame. `None` on any failure (already logged).
    fn fetch_frame(&mut self) -> Option<CapturedFrame>;

    /// Human-readable description of where frames come from.
    fn describe(&self) -> String;

    /// Availability probe for the status footer.
    fn is_available(&mut self) -> bool {
        self.fetch_frame().is_some()
    }
}
