use std::collections::VecDeque;

use anyhow::Result;
use image::RgbImage;

use crate::detect::backend::DetectorBackend;
use crate::detect::result::{Detection, SoftMask};

/// Stub backend for testing and `stub://` runs.
///
/// Replays a script of detection lists, one entry per `detect` call. Once the
/// script runs out (or was never provided) every frame yields no detections.
pub struct StubBackend {
    script: VecDeque<Vec<Detection>>,
    calls: u64,
}

impl StubBackend {
    pub fn new() -> Self {
        Self {
            script: VecDeque::new(),
            calls: 0,
        }
    }

    /// Replay the given detection lists in order, then return empty lists.
    pub fn with_script<I>(script: I) -> Self
    where
        I: IntoIterator<Item = Vec<Detection>>,
    {
        Self {
            script: script.into_iter().collect(),
            calls: 0,
        }
    }

    /// Queue one more frame's worth of detections.
    pub fn push_frame(&mut self, detections: Vec<Detection>) {
        self.script.push_back(detections);
    }

    /// Number of `detect` calls observed so far.
    pub fn calls(&self) -> u64 {
        self.calls
    }

    /// Build a full-frame detection for scripting convenience.
    pub fn full_frame_detection(
        width: u32,
        height: u32,
        label: u32,
        score: f32,
    ) -> Result<Detection> {
        let mask = SoftMask::new(width, height, vec![1.0; (width * height) as usize])?;
        Ok(Detection { label, score, mask })
    }
}

impl Default for StubBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl DetectorBackend for StubBackend {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn detect(&mut self, _frame: &RgbImage) -> Result<Vec<Detection>> {
        self.calls += 1;
        Ok(self.script.pop_front().unwrap_or_default())
    }
}
