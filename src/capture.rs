//! Interactive capture loop.
//!
//! Pulls frames from a source, displays each one, and blocks for a key
//! press. The capture key runs segmentation; a non-empty overlay is shown
//! and persisted as a raw/mask pair. Any other key advances to the next
//! frame. The loop ends normally when the source reports end-of-stream.
//!
//! Everything is synchronous and single-threaded: capture blocks until a
//! frame arrives, the key wait blocks indefinitely, inference blocks until
//! complete.

use anyhow::Result;

use crate::dataset::DatasetWriter;
use crate::detect::DetectorBackend;
use crate::ingest::FrameSource;
use crate::preview::{Preview, SEGMENTATION_WINDOW, VIDEO_WINDOW};
use crate::segment;

/// Key that triggers segmentation and persistence.
pub const CAPTURE_KEY: char = 'c';

/// Counters for one capture session.
#[derive(Clone, Copy, Debug, Default)]
pub struct CaptureStats {
    /// Frames pulled from the source.
    pub frames_seen: u64,
    /// Capture key presses, accepted or not.
    pub capture_requests: u64,
    /// Raw/mask pairs written.
    pub pairs_written: u64,
}

/// Run the capture loop until the source is exhausted.
pub fn run_capture(
    source: &mut dyn FrameSource,
    detector: &mut dyn DetectorBackend,
    preview: &mut dyn Preview,
    writer: &mut DatasetWriter,
    threshold: f32,
) -> Result<CaptureStats> {
    let mut stats = CaptureStats::default();

    while let Some(frame) = source.next_frame()? {
        stats.frames_seen += 1;
        preview.show(VIDEO_WINDOW, &frame)?;

        if preview.wait_key()? != Some(CAPTURE_KEY) {
            continue;
        }
        stats.capture_requests += 1;

        let detections = detector.detect(&frame)?;
        let Some(overlay) = segment::instance_overlay(&frame, &detections, threshold) else {
            // Nothing above threshold: no files, index untouched.
            log::info!("no detection above threshold {}, skipping", threshold);
            continue;
        };

        preview.show(SEGMENTATION_WINDOW, &overlay)?;
        let idx = writer.write_pair(&frame, &overlay)?;
        stats.pairs_written += 1;
        println!("captured image #{}", idx);
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::StubBackend;
    use crate::ingest::FrameSource;
    use crate::preview::ScriptedPreview;
    use anyhow::Result;
    use image::RgbImage;
    use tempfile::TempDir;

    struct VecSource {
        frames: Vec<RgbImage>,
    }

    impl FrameSource for VecSource {
        fn connect(&mut self) -> Result<()> {
            Ok(())
        }

        fn next_frame(&mut self) -> Result<Option<RgbImage>> {
            if self.frames.is_empty() {
                Ok(None)
            } else {
                Ok(Some(self.frames.remove(0)))
            }
        }
    }

    fn frames(n: usize) -> VecSource {
        VecSource {
            frames: (0..n).map(|_| RgbImage::new(8, 8)).collect(),
        }
    }

    #[test]
    fn capture_without_detection_writes_nothing() -> Result<()> {
        let root = TempDir::new()?;
        let mut source = frames(2);
        let mut detector = StubBackend::new();
        let mut preview = ScriptedPreview::with_keys(['c', 'c']);
        let mut writer = DatasetWriter::create(root.path(), "t", false)?;

        let stats = run_capture(
            &mut source,
            &mut detector,
            &mut preview,
            &mut writer,
            segment::DEFAULT_THRESHOLD,
        )?;

        assert_eq!(stats.frames_seen, 2);
        assert_eq!(stats.capture_requests, 2);
        assert_eq!(stats.pairs_written, 0);
        assert_eq!(writer.next_index(), 0);
        assert!(!root.path().join("t/raw/0.jpg").exists());
        Ok(())
    }

    #[test]
    fn accepted_capture_writes_pair_and_shows_overlay() -> Result<()> {
        let root = TempDir::new()?;
        let person = StubBackend::full_frame_detection(8, 8, 1, 0.9)?;
        let mut source = frames(1);
        let mut detector = StubBackend::with_script(vec![vec![person]]);
        let mut preview = ScriptedPreview::with_keys(['c']);
        let mut writer = DatasetWriter::create(root.path(), "t", false)?;

        let stats = run_capture(
            &mut source,
            &mut detector,
            &mut preview,
            &mut writer,
            segment::DEFAULT_THRESHOLD,
        )?;

        assert_eq!(stats.pairs_written, 1);
        assert_eq!(writer.next_index(), 1);
        assert!(root.path().join("t/raw/0.jpg").is_file());
        assert!(root.path().join("t/masks/0.jpg").is_file());

        let windows: Vec<&str> = preview.shown().iter().map(|(w, _)| w.as_str()).collect();
        assert_eq!(windows, vec![VIDEO_WINDOW, SEGMENTATION_WINDOW]);
        Ok(())
    }

    #[test]
    fn other_keys_advance_without_running_inference() -> Result<()> {
        let root = TempDir::new()?;
        let mut source = frames(3);
        let mut detector = StubBackend::new();
        let mut preview = ScriptedPreview::with_keys(['q', ' ', 'x']);
        let mut writer = DatasetWriter::create(root.path(), "t", false)?;

        let stats = run_capture(
            &mut source,
            &mut detector,
            &mut preview,
            &mut writer,
            segment::DEFAULT_THRESHOLD,
        )?;

        assert_eq!(stats.frames_seen, 3);
        assert_eq!(stats.capture_requests, 0);
        assert_eq!(detector.calls(), 0);
        Ok(())
    }

    #[test]
    fn exhausted_key_input_reads_as_skip() -> Result<()> {
        let root = TempDir::new()?;
        let mut source = frames(2);
        let mut detector = StubBackend::new();
        let mut preview = ScriptedPreview::with_keys([]);
        let mut writer = DatasetWriter::create(root.path(), "t", false)?;

        let stats = run_capture(
            &mut source,
            &mut detector,
            &mut preview,
            &mut writer,
            segment::DEFAULT_THRESHOLD,
        )?;

        assert_eq!(stats.frames_seen, 2);
        assert_eq!(stats.pairs_written, 0);
        Ok(())
    }
}
