use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

const DEFAULT_CAMERA_URL: &str = "stub://bench_camera";
const DEFAULT_CAMERA_TIMEOUT_SECS: u64 = 5;
const DEFAULT_REPORT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_DETECTOR_CMD: &str = "stub://box_oracle";
const DEFAULT_CONF_THRESHOLD: f32 = 0.25;
const DEFAULT_WORKSPACE_DIR: &str = "boxwatch_runs";
const DEFAULT_PREVIEW_INTERVAL_MS: u64 = 100;
const DEFAULT_FOOTER_INTERVAL_MS: u64 = 1000;

#[derive(Debug, Deserialize, Default)]
struct BoxwatchConfigFile {
    camera: Option<CameraConfigFile>,
    report: Option<ReportConfigFile>,
    detector: Option<DetectorConfigFile>,
    workspace_dir: Option<String>,
    intervals: Option<IntervalConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
struct CameraConfigFile {
    url: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
struct ReportConfigFile {
    url: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
struct DetectorConfigFile {
    cmd: Option<String>,
    conf_threshold: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
struct IntervalConfigFile {
    preview_ms: Option<u64>,
    footer_ms: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct BoxwatchConfig {
    pub camera: CameraSettings,
    pub report: ReportSettings,
    pub detector: DetectorSettings,
    pub workspace_dir: PathBuf,
    pub preview_interval: Duration,
    pub footer_interval: Duration,
}

#[derive(Debug, Clone)]
pub struct CameraSettings {
    pub url: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct ReportSettings {
    /// `None` disables reporting.
    pub url: Option<String>,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct DetectorSettings {
    /// External detector command line, or `stub://...` for the stub oracle.
    pub cmd: String,
    pub conf_threshold: f32,
}

impl BoxwatchConfig {
    /// Load configuration: JSON file named by `BOXWATCH_CONFIG` (if any),
    /// then env overrides, then validation.
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("BOXWATCH_CONFIG").ok();
        Self::load_from(config_path.as_deref().map(Path::new))
    }

    /// Same as `load`, with an explicit config file path (e.g. `--config`).
    pub fn load_from(config_path: Option<&Path>) -> Result<Self> {
        let file_cfg = match config_path {
            Some(path) => Some(read_config_file(path)?),
            None => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default());
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: BoxwatchConfigFile) -> Self {
        let camera = CameraSettings {
            url: file
                .camera
                .as_ref()
                .and_then(|camera| camera.url.clone())
                .unwrap_or_else(|| DEFAULT_CAMERA_URL.to_string()),
            timeout: Duration::from_secs(
                file.camera
                    .as_ref()
                    .and_then(|camera| camera.timeout_secs)
                    .unwrap_or(DEFAULT_CAMERA_TIMEOUT_SECS),
            ),
        };
        let report = ReportSettings {
            url: file.report.as_ref().and_then(|report| report.url.clone()),
            timeout: Duration::from_secs(
                file.report
                    .as_ref()
                    .and_then(|report| report.timeout_secs)
                    .unwrap_or(DEFAULT_REPORT_TIMEOUT_SECS),
            ),
        };
        let detector = DetectorSettings {
            cmd: file
                .detector
                .as_ref()
                .and_then(|detector| detector.cmd.clone())
                .unwrap_or_else(|| DEFAULT_DETECTOR_CMD.to_string()),
            conf_threshold: file
                .detector
                .as_ref()
                .and_then(|detector| detector.conf_threshold)
                .unwrap_or(DEFAULT_CONF_THRESHOLD),
        };
        let workspace_dir = PathBuf::from(
            file.workspace_dir
                .unwrap_or_else(|| DEFAULT_WORKSPACE_DIR.to_string()),
        );
        let preview_interval = Duration::from_millis(
            file.intervals
                .as_ref()
                .and_then(|intervals| intervals.preview_ms)
                .unwrap_or(DEFAULT_PREVIEW_INTERVAL_MS),
        );
        let footer_interval = Duration::from_millis(
            file.intervals
                .and_then(|intervals| intervals.footer_ms)
                .unwrap_or(DEFAULT_FOOTER_INTERVAL_MS),
        );
        Self {
            camera,
            report,
            detector,
            workspace_dir,
            preview_interval,
            footer_interval,
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(url) = std::env::var("BOXWATCH_CAMERA_URL") {
            if !url.trim().is_empty() {
                self.camera.url = url;
            }
        }
        if let Ok(url) = std::env::var("BOXWATCH_REPORT_URL") {
            if !url.trim().is_empty() {
                self.report.url = Some(url);
            }
        }
        if let Ok(cmd) = std::env::var("BOXWATCH_DETECTOR_CMD") {
            if !cmd.trim().is_empty() {
                self.detector.cmd = cmd;
            }
        }
        if let Ok(dir) = std::env::var("BOXWATCH_WORKSPACE_DIR") {
            if !dir.trim().is_empty() {
                self.workspace_dir = PathBuf::from(dir);
            }
        }
        if let Ok(threshold) = std::env::var("BOXWATCH_CONF_THRESHOLD") {
            let parsed: f32 = threshold
                .parse()
                .map_err(|_| anyhow!("BOXWATCH_CONF_THRESHOLD must be a number"))?;
            self.detector.conf_threshold = parsed;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        let camera_url = Url::parse(&self.camera.url)
            .map_err(|e| anyhow!("invalid camera url '{}': {}", self.camera.url, e))?;
        if !matches!(camera_url.scheme(), "http" | "https" | "stub") {
            return Err(anyhow!(
                "camera url scheme '{}' not supported; expected http(s) or stub",
                camera_url.scheme()
            ));
        }
        if let Some(report_url) = &self.report.url {
            let parsed = Url::parse(report_url)
                .map_err(|e| anyhow!("invalid report url '{}': {}", report_url, e))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(anyhow!(
                    "report url scheme '{}' not supported; expected http(s)",
                    parsed.scheme()
                ));
            }
        }
        if self.detector.cmd.trim().is_empty() {
            return Err(anyhow!("detector command must not be empty"));
        }
        if !(self.detector.conf_threshold > 0.0 && self.detector.conf_threshold <= 1.0) {
            return Err(anyhow!("conf_threshold must be in (0, 1]"));
        }
        if self.camera.timeout.is_zero() || self.report.timeout.is_zero() {
            return Err(anyhow!("timeouts must be greater than zero"));
        }
        if self.preview_interval.is_zero() || self.footer_interval.is_zero() {
            return Err(anyhow!("intervals must be greater than zero"));
        }
        Ok(())
    }
}

fn read_config_file(path: &Path) -> Result<BoxwatchConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let cfg = serde_json::from_str(&raw)
        .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?;
    Ok(cfg)
}
