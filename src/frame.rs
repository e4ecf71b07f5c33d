//! Captured still frames.
//!
//! A `CapturedFrame` is a decoded RGB8 pixel buffer produced by a frame
//! source. Frames are ephemeral: the pipeline persists one to the scratch
//! workspace and drops it; the presentation loop summarizes one for the
//! preview and drops it. Nothing retains a frame across runs.

use std::io::Cursor;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use image::{GenericImageView, ImageFormat, RgbImage};

/// A decoded still image (RGB8, row-major).
#[derive(Clone, Debug)]
pub struct CapturedFrame {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
}

impl CapturedFrame {
    /// Wrap a raw RGB8 buffer. The buffer length must be `width * height * 3`.
    pub fn new(pixels: Vec<u8>, width: u32, height: u32) -> Result<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|v| v.checked_mul(3))
            .ok_or_else(|| anyhow!("frame dimensions overflow"))?;
        if pixels.len() != expected {
            return Err(anyhow!(
                "expected {} RGB bytes for {}x{}, received {}",
                expected,
                width,
                height,
                pixels.len()
            ));
        }
        Ok(Self {
            pixels,
            width,
            height,
        })
    }

    /// Decode an encoded still image (JPEG, PNG, ...) into a frame.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let image = image::load_from_memory(bytes).context("decode snapshot image")?;
        let (width, height) = image.dimensions();
        let rgb = image.into_rgb8();
        Ok(Self {
            pixels: rgb.into_raw(),
            width,
            height,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Encode the frame as JPEG in memory.
    pub fn encode_jpeg(&self) -> Result<Vec<u8>> {
        let image = self.to_rgb_image()?;
        let mut bytes = Cursor::new(Vec::new());
        image
            .write_to(&mut bytes, ImageFormat::Jpeg)
            .context("encode frame as jpeg")?;
        Ok(bytes.into_inner())
    }

    /// Write the frame to `path` as JPEG, overwriting any existing file.
    pub fn save_jpeg(&self, path: &Path) -> Result<()> {
        let bytes = self.encode_jpeg()?;
        std::fs::write(path, bytes)
            .with_context(|| format!("write captured frame to {}", path.display()))?;
        Ok(())
    }

    /// Mean luminance in 0..=255, used by the terminal preview.
    pub fn mean_luma(&self) -> u8 {
        if self.pixels.is_empty() {
            return 0;
        }
        let mut sum: u64 = 0;
        let mut count: u64 = 0;
        for chunk in self.pixels.chunks_exact(3) {
            // Integer Rec.601 approximation.
            let luma =
                (299 * chunk[0] as u64 + 587 * chunk[1] as u64 + 114 * chunk[2] as u64) / 1000;
            sum += luma;
            count += 1;
        }
        (sum / count.max(1)) as u8
    }

    fn to_rgb_image(&self) -> Result<RgbImage> {
        RgbImage::from_raw(self.width, self.height, self.pixels.clone())
            .ok_or_else(|| anyhow!("pixel buffer does not match {}x{}", self.width, self.height))
    }
}
