//! HTTP snapshot frame source.
//!
//! Issues one bounded-timeout GET per fetch against a still-capture camera
//! endpoint (e.g. an ESP32 or Raspberry Pi `/capture` handler) and decodes
//! the response body in memory. No streaming, no connection reuse
//! assumptions, no retry.

use std::io::Read;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use url::Url;

use crate::frame::CapturedFrame;
use crate::ingest::FrameSource;

const MAX_SNAPSHOT_BYTES: usize = 5 * 1024 * 1024;

/// Configuration for a snapshot source.
#[derive(Clone, Debug)]
pub struct SnapshotConfig {
    /// Camera URL. Supported schemes: http(s) for live cameras, stub for a
    /// synthetic source.
    pub url: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            url: "stub://bench_camera".to_string(),
            timeout: Duration::from_secs(5),
        }
    }
}

/// Snapshot frame source.
pub struct SnapshotSource {
    backend: SnapshotBackend,
    url: String,
    frames_fetched: u64,
}

enum SnapshotBackend {
    Http(HttpSnapshot),
    Stub(StubSnapshot),
}

impl SnapshotSource {
    pub fn new(config: SnapshotConfig) -> Result<Self> {
        let url = Url::parse(&config.url).context("parse camera url")?;
        let backend = match url.scheme() {
            "http" | "https" => SnapshotBackend::Http(HttpSnapshot::new(&config)),
            "stub" => SnapshotBackend::Stub(StubSnapshot::new()),
            other => {
                return Err(anyhow!(
                    "unsupported camera scheme '{}'; expected http(s) or stub",
                    other
                ))
            }
        };
        Ok(Self {
            backend,
            url: config.url,
            frames_fetched: 0,
        })
    }

    /// Frames fetched so far, across pipeline and preview callers.
    pub fn frames_fetched(&self) -> u64 {
        self.frames_fetched
    }
}

impl FrameSource for SnapshotSource {
    fn fetch_frame(&mut self) -> Option<CapturedFrame> {
        let fetched = match &mut self.backend {
            SnapshotBackend::Http(source) => source.fetch(),
            SnapshotBackend::Stub(source) => source.fetch(),
        };
        match fetched {
            Ok(frame) => {
                self.frames_fetched += 1;
                Some(frame)
            }
            Err(e) => {
                log::warn!("snapshot fetch from {} failed: {:#}", self.url, e);
                None
            }
        }
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

struct HttpSnapshot {
    url: String,
    agent: ureq::Agent,
}

impl HttpSnapshot {
    fn new(config: &SnapshotConfig) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(config.timeout).build();
        Self {
            url: config.url.clone(),
            agent,
        }
    }

    fn fetch(&mut self) -> Result<CapturedFrame> {
        let response = self
            .agent
            .get(&self.url)
            .call()
            .context("camera snapshot request")?;
        let mut bytes = Vec::new();
        response
            .into_reader()
            .take(MAX_SNAPSHOT_BYTES as u64 + 1)
            .read_to_end(&mut bytes)
            .context("read snapshot body")?;
        if bytes.is_empty() {
            return Err(anyhow!("empty snapshot body"));
        }
        if bytes.len() > MAX_SNAPSHOT_BYTES {
            return Err(anyhow!("snapshot exceeded {} bytes", MAX_SNAPSHOT_BYTES));
        }
        CapturedFrame::decode(&bytes)
    }
}

// ----------------------------------------------------------------------------
// Synthetic source (stub://) for tests and offline demos
// ----------------------------------------------------------------------------

struct StubSnapshot {
    frame_count: u64,
    scene_state: u8,
}

impl StubSnapshot {
    fn new() -> Self {
        Self {
            frame_count: 0,
            scene_state: 0,
        }
    }

    fn fetch(&mut self) -> Result<CapturedFrame> {
        self.frame_count += 1;
        // Scene shifts every 50 frames so previews visibly change.
        if self.frame_count % 50 == 0 {
            self.scene_state = self.scene_state.wrapping_add(1);
        }
        let mut pixels = vec![0u8; (64 * 48 * 3) as usize];
        for (i, pixel) in pixels.iter_mut().enumerate() {
            *pixel = ((i as u64 + self.frame_count + self.scene_state as u64) % 256) as u8;
        }
        CapturedFrame::new(pixels, 64, 48)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stub_source_produces_frames() {
        let mut source = SnapshotSource::new(SnapshotConfig::default()).unwrap();
        let frame = source.fetch_frame().expect("stub frame");
        assert_eq!(frame.width(), 64);
        assert_eq!(frame.height(), 48);
        assert_eq!(source.frames_fetched(), 1);
    }

    #[test]
    fn rejects_unknown_scheme() {
        let config = SnapshotConfig {
            url: "rtsp://camera-1".to_string(),
            ..SnapshotConfig::default()
        };
        assert!(SnapshotSource::new(config).is_err());
    }

    #[test]
    fn availability_tracks_fetch() {
        let mut source = SnapshotSource::new(SnapshotConfig::default()).unwrap();
        assert!(source.is_available());
    }
}
