//! boxwatchd - box condition inspection daemon
//!
//! This daemon:
//! 1. Polls the camera on a fixed interval for a live preview + status footer
//! 2. On a user trigger (Enter), runs one capture-and-classify cycle
//! 3. Records each verdict in the in-process history
//! 4. Forwards verdict + annotated image to the validation API (fire-and-forget)
//!
//! The loop is single-threaded and cooperative: a running capture cycle
//! starves the preview ticks until it finishes. A cycle cannot be aborted
//! once started. Ctrl-C stops the loop between cycles.

use std::io::{BufRead, IsTerminal};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;

use boxwatch::{
    backend_for_command, render, AppState, BoxwatchConfig, FrameSource, HttpReporter,
    InspectionPipeline, NullReporter, PreviewSummary, ReportMode, Reporter, SessionHistory,
    SnapshotConfig, SnapshotSource, Ui, Workspace, TIMESTAMP_FORMAT,
};

#[derive(Parser, Debug)]
#[command(name = "boxwatchd", about = "Box condition inspection daemon")]
struct Args {
    /// Config file path (JSON). Overrides BOXWATCH_CONFIG.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Run exactly one capture cycle and exit.
    #[arg(long)]
    once: bool,

    /// Terminal style: auto, plain, or pretty.
    #[arg(long)]
    ui: Option<String>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let cfg = match args.config.as_deref() {
        Some(path) => BoxwatchConfig::load_from(Some(path)),
        None => BoxwatchConfig::load(),
    }
    .context("load configuration")?;

    let ui = Ui::from_args(args.ui.as_deref(), std::io::stderr().is_terminal());

    let mut source = SnapshotSource::new(SnapshotConfig {
        url: cfg.camera.url.clone(),
        timeout: cfg.camera.timeout,
    })?;

    let oracle = backend_for_command(&cfg.detector.cmd)?;
    log::info!(
        "oracle backend '{}' (conf threshold {})",
        oracle.name(),
        cfg.detector.conf_threshold
    );

    let reporter: Arc<dyn Reporter> = match cfg.report.url.clone() {
        Some(url) => {
            log::info!("reporting to {}", url);
            Arc::new(HttpReporter::new(url, cfg.report.timeout))
        }
        None => {
            log::info!("no report endpoint configured; reporting disabled");
            Arc::new(NullReporter)
        }
    };

    let workspace = Workspace::new(&cfg.workspace_dir);
    let mut pipeline = InspectionPipeline::new(
        workspace,
        oracle,
        reporter,
        cfg.detector.conf_threshold,
    );

    let mut history = SessionHistory::new();
    let mut state = AppState {
        status_line: "waiting for trigger".to_string(),
        clock: chrono::Local::now().format(TIMESTAMP_FORMAT).to_string(),
        ..AppState::default()
    };

    if args.once {
        // The process must not exit before the report attempt.
        pipeline = pipeline.with_report_mode(ReportMode::Blocking);
        run_capture(&ui, &mut pipeline, &mut source, &mut history, &mut state);
        state.clock = chrono::Local::now().format(TIMESTAMP_FORMAT).to_string();
        println!("{}", render(&state, &history));
        return Ok(());
    }

    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = stop.clone();
        ctrlc::set_handler(move || stop.store(true, Ordering::SeqCst))
            .context("install ctrl-c handler")?;
    }

    let trigger_rx = spawn_stdin_trigger();

    log::info!("boxwatchd running; camera {}", source.describe());
    println!("press Enter to capture and classify, Ctrl-C to quit");

    let mut last_footer = Instant::now();
    while !stop.load(Ordering::SeqCst) {
        match trigger_rx.recv_timeout(cfg.preview_interval) {
            Ok(()) => {
                run_capture(&ui, &mut pipeline, &mut source, &mut history, &mut state);
                println!("{}", render(&state, &history));
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }

        // Preview tick: an independent fetch, shared with nothing.
        state.preview = source.fetch_frame().as_ref().map(PreviewSummary::of);

        // Footer tick: clock + camera availability (taken from the preview
        // fetch this tick already performed).
        if last_footer.elapsed() >= cfg.footer_interval {
            state.clock = chrono::Local::now().format(TIMESTAMP_FORMAT).to_string();
            state.camera_active = state.preview.is_some();
            last_footer = Instant::now();
            println!("{}", render(&state, &history));
        }
    }

    log::info!(
        "shutting down after {} completed runs, {} frames fetched",
        history.len(),
        source.frames_fetched()
    );
    Ok(())
}

/// Run one capture cycle and fold the outcome into the app state.
///
/// Failures are surfaced exactly once, here. The run guard restores the
/// progress indicator whether the cycle succeeds or fails.
fn run_capture(
    ui: &Ui,
    pipeline: &mut InspectionPipeline,
    source: &mut dyn FrameSource,
    history: &mut SessionHistory,
    state: &mut AppState,
) {
    let guard = ui.begin_run();
    guard.stage(25, "capturing image");
    guard.stage(50, "processing image");
    match pipeline.run(source, history) {
        Ok(run) => {
            guard.stage(100, "processing complete");
            state.status_line = "processing complete".to_string();
            state.last_verdict = Some(run.verdict.to_string());
            state.annotated_path = Some(run.annotated_path);
        }
        Err(e) => {
            state.status_line = "processing failed".to_string();
            log::error!("capture cycle failed: {:#}", e);
        }
    }
}

/// Reads stdin lines and emits one trigger per line. The reader thread ends
/// with stdin; the main loop then sees a disconnect and exits.
fn spawn_stdin_trigger() -> mpsc::Receiver<()> {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            if line.is_err() || tx.send(()).is_err() {
                break;
            }
        }
    });
    rx
}
