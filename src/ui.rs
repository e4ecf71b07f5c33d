use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

#[derive(Clone, Copy, Debug)]
pub enum UiMode {
    Auto,
    Plain,
    Pretty,
}

/// Terminal affordances for a capture run.
///
/// The pretty mode drives a determinate progress bar through the pipeline
/// stages; plain mode prints stage lines to stderr. Either way the run
/// guard clears the indicator on drop, so the capture control is re-armed
/// on every exit path, including failures.
#[derive(Clone, Debug)]
pub struct Ui {
    mode: UiMode,
    is_tty: bool,
}

impl Ui {
    pub fn new(mode: UiMode, is_tty: bool) -> Self {
        Self { mode, is_tty }
    }

    pub fn from_args(ui_flag: Option<&str>, is_tty: bool) -> Self {
        let mode = match ui_flag {
            Some("plain") => UiMode::Plain,
            Some("pretty") => UiMode::Pretty,
            _ => UiMode::Auto,
        };
        Self::new(mode, is_tty)
    }

    /// Begin a capture run. The returned guard owns the progress indicator.
    pub fn begin_run(&self) -> RunGuard {
        let use_pretty = match self.mode {
            UiMode::Pretty => true,
            UiMode::Plain => false,
            UiMode::Auto => self.is_tty,
        };

        if use_pretty {
            let bar = ProgressBar::new(100);
            bar.set_draw_target(ProgressDrawTarget::stderr());
            let style = ProgressStyle::with_template("[{bar:40}] {pos:>3}% {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar());
            bar.set_style(style);
            bar.enable_steady_tick(Duration::from_millis(120));
            RunGuard { bar: Some(bar) }
        } else {
            RunGuard { bar: None }
        }
    }
}

pub struct RunGuard {
    bar: Option<ProgressBar>,
}

impl RunGuard {
    /// Advance the indicator to `percent` with a stage message.
    pub fn stage(&self, percent: u64, message: &str) {
        if let Some(bar) = &self.bar {
            bar.set_position(percent.min(100));
            bar.set_message(message.to_string());
        } else {
            eprintln!("==> {}", message);
        }
    }
}

impl Drop for RunGuard {
    // Reset the indicator no matter where the run stopped.
    fn drop(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}
