//! Terminal rendering.
//!
//! `AppState` is the single explicit UI-bound state struct; `render` is a
//! pure projection of state (plus history) to text. Both the pipeline
//! completion path and the periodic timer ticks mutate `AppState` and call
//! `render`; nothing else holds live references to display data.

use std::fmt::Write as _;
use std::path::PathBuf;

use crate::frame::CapturedFrame;
use crate::history::SessionHistory;

/// Coarse preview of the latest live frame. The terminal surface cannot
/// blit pixels, so the preview is reduced to dimensions and brightness.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PreviewSummary {
    pub width: u32,
    pub height: u32,
    pub mean_luma: u8,
}

impl PreviewSummary {
    pub fn of(frame: &CapturedFrame) -> Self {
        Self {
            width: frame.width(),
            height: frame.height(),
            mean_luma: frame.mean_luma(),
        }
    }
}

/// Everything the display surface shows.
#[derive(Clone, Debug, Default)]
pub struct AppState {
    pub status_line: String,
    pub last_verdict: Option<String>,
    pub annotated_path: Option<PathBuf>,
    pub preview: Option<PreviewSummary>,
    pub camera_active: bool,
    pub clock: String,
}

/// Project state to the terminal surface. Pure: no I/O, no clock reads.
pub fn render(state: &AppState, history: &SessionHistory) -> String {
    let mut out = String::new();

    match &state.preview {
        Some(preview) => {
            let _ = writeln!(
                out,
                "preview {}x{} luma {}",
                preview.width, preview.height, preview.mean_luma
            );
        }
        None => {
            let _ = writeln!(out, "preview unavailable");
        }
    }

    if !state.status_line.is_empty() {
        let _ = writeln!(out, "status: {}", state.status_line);
    }

    if let Some(verdict) = &state.last_verdict {
        let _ = writeln!(out, "resultado: {}", verdict);
    }
    if let Some(path) = &state.annotated_path {
        let _ = writeln!(out, "annotated image: {}", path.display());
    }

    if !history.is_empty() {
        let _ = writeln!(out, "history ({} runs):", history.len());
        for entry in history.entries() {
            let _ = writeln!(out, "  {}  {}", entry.timestamp, entry.verdict);
        }
    }

    let camera = if state.camera_active {
        "active"
    } else {
        "inactive"
    };
    let _ = write!(out, "{} | camera {}", state.clock, camera);

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Verdict;

    #[test]
    fn render_is_a_function_of_state() {
        let state = AppState {
            status_line: "idle".into(),
            clock: "2025-01-01 10:00:00".into(),
            camera_active: true,
            ..AppState::default()
        };
        let history = SessionHistory::new();
        assert_eq!(render(&state, &history), render(&state, &history));
    }

    #[test]
    fn render_lists_history_in_order() {
        let mut history = SessionHistory::new();
        history.append("2025-01-01 10:00:00".into(), Verdict::Good);
        history.append("2025-01-01 10:05:00".into(), Verdict::Damaged);

        let output = render(&AppState::default(), &history);
        let good = output.find("Caixa em boas condições").unwrap();
        let damaged = output.find("Caixa danificada").unwrap();
        assert!(good < damaged);
    }

    #[test]
    fn footer_reflects_camera_flag() {
        let mut state = AppState::default();
        state.camera_active = false;
        let history = SessionHistory::new();
        assert!(render(&state, &history).contains("camera inactive"));
        state.camera_active = true;
        assert!(render(&state, &history).contains("camera active"));
    }
}
