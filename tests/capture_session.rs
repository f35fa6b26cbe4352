use anyhow::Result;
use image::RgbImage;
use tempfile::TempDir;

use maskcap::{
    run_capture, DatasetWriter, FrameSource, ImageGlobSource, ScriptedPreview, StubBackend,
    CAPTURE_HEIGHT, CAPTURE_WIDTH, DEFAULT_THRESHOLD,
};

fn seed_images(dir: &TempDir, count: usize) -> Result<String> {
    for i in 0..count {
        let img = RgbImage::from_pixel(320, 240, image::Rgb([i as u8 * 40, 80, 120]));
        img.save(dir.path().join(format!("{}.jpg", i)))?;
    }
    Ok(format!("{}/*.jpg", dir.path().display()))
}

#[test]
fn session_writes_paired_indices_for_accepted_captures() -> Result<()> {
    let images = TempDir::new()?;
    let out = TempDir::new()?;
    let pattern = seed_images(&images, 3)?;

    let mut source = ImageGlobSource::new(&pattern);
    source.connect()?;

    // Frames 0 and 2 are captured with a person present; frame 1 is skipped.
    let person = || StubBackend::full_frame_detection(CAPTURE_WIDTH, CAPTURE_HEIGHT, 1, 0.8);
    let mut detector = StubBackend::with_script(vec![vec![person()?], vec![person()?]]);
    let mut preview = ScriptedPreview::with_keys(['c', 'x', 'c']);
    let mut writer = DatasetWriter::create(out.path(), "session", false)?;

    let stats = run_capture(
        &mut source,
        &mut detector,
        &mut preview,
        &mut writer,
        DEFAULT_THRESHOLD,
    )?;

    assert_eq!(stats.frames_seen, 3);
    assert_eq!(stats.pairs_written, 2);

    for idx in 0..2 {
        let raw = out.path().join(format!("session/raw/{}.jpg", idx));
        let mask = out.path().join(format!("session/masks/{}.jpg", idx));
        assert!(raw.is_file(), "missing {}", raw.display());
        assert!(mask.is_file(), "missing {}", mask.display());
    }
    assert!(!out.path().join("session/raw/2.jpg").exists());

    // Written mask overlays keep the capture resolution
    let overlay = image::open(out.path().join("session/masks/0.jpg"))?.into_rgb8();
    assert_eq!(overlay.dimensions(), (CAPTURE_WIDTH, CAPTURE_HEIGHT));
    Ok(())
}

#[test]
fn capture_without_person_above_threshold_leaves_dataset_empty() -> Result<()> {
    let images = TempDir::new()?;
    let out = TempDir::new()?;
    let pattern = seed_images(&images, 2)?;

    let mut source = ImageGlobSource::new(&pattern);
    source.connect()?;

    // Low-confidence person only: below threshold, no cutoff, nothing saved.
    let weak = StubBackend::full_frame_detection(CAPTURE_WIDTH, CAPTURE_HEIGHT, 1, 0.3)?;
    let mut detector = StubBackend::with_script(vec![vec![weak]]);
    let mut preview = ScriptedPreview::with_keys(['c', 'c']);
    let mut writer = DatasetWriter::create(out.path(), "empty", false)?;

    let stats = run_capture(
        &mut source,
        &mut detector,
        &mut preview,
        &mut writer,
        DEFAULT_THRESHOLD,
    )?;

    assert_eq!(stats.capture_requests, 2);
    assert_eq!(stats.pairs_written, 0);
    assert_eq!(writer.next_index(), 0);
    assert!(!out.path().join("empty/raw/0.jpg").exists());
    Ok(())
}

#[test]
fn rerun_with_overwrite_resets_the_dataset() -> Result<()> {
    let images = TempDir::new()?;
    let out = TempDir::new()?;
    let pattern = seed_images(&images, 1)?;

    let run = |overwrite: bool| -> Result<u64> {
        let mut source = ImageGlobSource::new(&pattern);
        source.connect()?;
        let person = StubBackend::full_frame_detection(CAPTURE_WIDTH, CAPTURE_HEIGHT, 1, 0.9)?;
        let mut detector = StubBackend::with_script(vec![vec![person]]);
        let mut preview = ScriptedPreview::with_keys(['c']);
        let mut writer = DatasetWriter::create(out.path(), "redo", overwrite)?;
        let stats = run_capture(
            &mut source,
            &mut detector,
            &mut preview,
            &mut writer,
            DEFAULT_THRESHOLD,
        )?;
        Ok(stats.pairs_written)
    };

    assert_eq!(run(false)?, 1);

    // Second run without --overwrite refuses before touching anything
    assert!(DatasetWriter::create(out.path(), "redo", false).is_err());
    assert!(out.path().join("redo/raw/0.jpg").is_file());

    // With overwrite the index restarts at 0 over a clean directory pair
    assert_eq!(run(true)?, 1);
    assert!(out.path().join("redo/raw/0.jpg").is_file());
    assert!(!out.path().join("redo/raw/1.jpg").exists());
    Ok(())
}
