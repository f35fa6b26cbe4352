//! Still-image frame source.
//!
//! Walks a filesystem glob of images in sorted order and serves each as one
//! frame, resized to the capture resolution. Used for re-segmenting frames
//! captured in an earlier session.

use std::path::PathBuf;

use anyhow::{Context, Result};
use image::imageops::FilterType;
use image::RgbImage;

use super::{FrameSource, CAPTURE_HEIGHT, CAPTURE_WIDTH};

/// Frame source backed by a glob of still images.
pub struct ImageGlobSource {
    pattern: String,
    paths: Vec<PathBuf>,
    pos: usize,
    width: u32,
    height: u32,
}

impl ImageGlobSource {
    pub fn new(pattern: &str) -> Self {
        Self {
            pattern: pattern.to_string(),
            paths: Vec::new(),
            pos: 0,
            width: CAPTURE_WIDTH,
            height: CAPTURE_HEIGHT,
        }
    }

    /// Override the resize target.
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Number of images remaining.
    pub fn remaining(&self) -> usize {
        self.paths.len().saturating_sub(self.pos)
    }
}

impl FrameSource for ImageGlobSource {
    fn connect(&mut self) -> Result<()> {
        let entries = glob::glob(&self.pattern)
            .with_context(|| format!("invalid image glob {}", self.pattern))?;
        let mut paths = Vec::new();
        for entry in entries {
            paths.push(entry.context("read glob entry")?);
        }
        // Glob order is platform-dependent; sort for a stable frame sequence.
        paths.sort();

        log::info!(
            "ImageGlobSource: {} images matched {}",
            paths.len(),
            self.pattern
        );
        self.paths = paths;
        self.pos = 0;
        Ok(())
    }

    fn next_frame(&mut self) -> Result<Option<RgbImage>> {
        let Some(path) = self.paths.get(self.pos) else {
            return Ok(None);
        };
        self.pos += 1;

        let image = image::open(path)
            .with_context(|| format!("read image {}", path.display()))?
            .into_rgb8();
        let frame = if image.dimensions() == (self.width, self.height) {
            image
        } else {
            image::imageops::resize(&image, self.width, self.height, FilterType::Triangle)
        };
        Ok(Some(frame))
    }
}
