//! Frame capture and animated GIF encoding for demo runs

use anyhow::{Context, Result, bail};
use gif::{Encoder, Frame, Repeat};
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::info;

use super::FrameBuffer;

/// GIF quantization speed (1 = best quality, 30 = fastest)
const QUANTIZE_SPEED: i32 = 10;

/// Collects frames during an episode and encodes them at a fixed frame rate
pub struct VideoRecorder {
    fps: u32,
    frames: Vec<FrameBuffer>,
}

impl VideoRecorder {
    pub fn new(fps: u32) -> Self {
        Self {
            fps: fps.max(1),
            frames: Vec::new(),
        }
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// Per-frame delay in GIF centiseconds, rounded to the nearest unit
    fn frame_delay(&self) -> u16 {
        ((100 + self.fps / 2) / self.fps).max(1) as u16
    }

    /// Store a copy of the current frame
    pub fn capture_frame(&mut self, frame: &FrameBuffer) {
        self.frames.push(frame.clone());
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Encode all captured frames to `path` and clear the recorder
    ///
    /// The file is written next to its destination and renamed into place.
    pub fn save_video(&mut self, path: &Path) -> Result<()> {
        let Some(first) = self.frames.first() else {
            bail!("No frames to save to {:?}", path);
        };

        let width = u16::try_from(first.width())
            .with_context(|| format!("Frame width {} too large for GIF", first.width()))?;
        let height = u16::try_from(first.height())
            .with_context(|| format!("Frame height {} too large for GIF", first.height()))?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory: {:?}", dir))?;

        let tmp = NamedTempFile::new_in(dir)
            .with_context(|| format!("Failed to create temp file in {:?}", dir))?;
        {
            let mut encoder = Encoder::new(BufWriter::new(tmp.as_file()), width, height, &[])
                .context("Failed to start GIF encoder")?;
            encoder
                .set_repeat(Repeat::Infinite)
                .context("Failed to set GIF repeat")?;

            let delay = self.frame_delay();
            for frame in &self.frames {
                let mut gif_frame =
                    Frame::from_rgb_speed(width, height, frame.pixels(), QUANTIZE_SPEED);
                gif_frame.delay = delay;
                encoder
                    .write_frame(&gif_frame)
                    .context("Failed to encode frame")?;
            }

            let mut writer = encoder.into_inner().context("Failed to finish GIF")?;
            writer.flush().context("Failed to flush GIF")?;
        }

        tmp.persist(path)
            .with_context(|| format!("Failed to write video to {:?}", path))?;

        info!(path = ?path, frames = self.frames.len(), fps = self.fps, "video saved");
        self.frames.clear();

        Ok(())
    }
}
