//! maskcap - interactive person-mask dataset capture
//!
//! Previews frames from a camera or an image glob, and on the capture key:
//! 1. Runs the configured instance-segmentation backend on the frame
//! 2. Composites retained "person" masks into an overlay
//! 3. Writes the raw frame and overlay as a paired dataset record

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::Parser;

use maskcap::ingest::camera::device_path_for_id;
use maskcap::{
    run_capture, CameraConfig, CameraSource, CaptureConfig, DatasetWriter, DetectorBackend,
    FrameSource, ImageGlobSource, StubBackend, Ui,
};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Dataset name; pairs land under <out>/<name>/{raw,masks}.
    #[arg(long, visible_alias = "dataset_name")]
    dataset_name: Option<String>,
    /// Camera device index or path (e.g. 4 or /dev/video4).
    #[arg(long, visible_alias = "video_id")]
    video_id: Option<String>,
    /// Glob of still images to segment instead of a live camera.
    #[arg(long)]
    images: Option<String>,
    /// Confidence threshold for a detection to count as found.
    #[arg(long)]
    threshold: Option<f32>,
    /// Mask R-CNN ONNX export to load (requires the backend-tract feature).
    #[arg(long)]
    model: Option<PathBuf>,
    /// Root directory for datasets.
    #[arg(long)]
    out: Option<PathBuf>,
    /// Delete and recreate the dataset's raw/ and masks/ directories if they
    /// already exist.
    #[arg(long)]
    overwrite: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut cfg = CaptureConfig::load()?;
    merge_args(&mut cfg, &args);

    let dataset_name = cfg
        .dataset_name
        .clone()
        .ok_or_else(|| anyhow!("a dataset name is required (--dataset-name)"))?;

    let ui = Ui::auto();
    let mut detector = load_detector(&cfg, &ui)?;
    let mut source = open_source(&cfg)?;

    // Open failures are not fatal: the loop below just observes an
    // immediately exhausted source. This mirrors the historical tool.
    if let Err(err) = source.connect() {
        log::error!("error opening video source: {:#}", err);
    }

    let mut writer = DatasetWriter::create(&cfg.out_root, &dataset_name, args.overwrite)?;

    #[cfg(feature = "preview-window")]
    let mut preview = maskcap::preview::WindowPreview::new();
    #[cfg(not(feature = "preview-window"))]
    let mut preview = maskcap::ConsolePreview::new();

    log::info!(
        "capturing and segmenting images into {}/{} (threshold {})",
        cfg.out_root.display(),
        dataset_name,
        cfg.threshold
    );

    let stats = run_capture(
        &mut *source,
        &mut *detector,
        &mut preview,
        &mut writer,
        cfg.threshold,
    )?;

    log::info!(
        "done: {} frames seen, {} capture requests, {} pairs written",
        stats.frames_seen,
        stats.capture_requests,
        stats.pairs_written
    );
    Ok(())
}

fn merge_args(cfg: &mut CaptureConfig, args: &Args) {
    if let Some(name) = &args.dataset_name {
        cfg.dataset_name = Some(name.clone());
    }
    if let Some(video_id) = &args.video_id {
        cfg.source.video_id = Some(video_id.clone());
    }
    if let Some(images) = &args.images {
        cfg.source.images = Some(images.clone());
    }
    if let Some(threshold) = args.threshold {
        cfg.threshold = threshold;
    }
    if let Some(model) = &args.model {
        cfg.model = Some(model.clone());
    }
    if let Some(out) = &args.out {
        cfg.out_root = out.clone();
    }
}

fn load_detector(cfg: &CaptureConfig, ui: &Ui) -> Result<Box<dyn DetectorBackend>> {
    match &cfg.model {
        Some(model_path) => {
            #[cfg(feature = "backend-tract")]
            {
                let _stage = ui.stage("loading model");
                let mut backend = maskcap::TractBackend::new(
                    model_path,
                    cfg.source.width,
                    cfg.source.height,
                )?;
                backend.warm_up()?;
                Ok(Box::new(backend))
            }
            #[cfg(not(feature = "backend-tract"))]
            {
                Err(anyhow!(
                    "model {} configured, but this build lacks the backend-tract feature",
                    model_path.display()
                ))
            }
        }
        None => {
            let _stage = ui.stage("loading model");
            log::warn!("no model configured; using the stub detector (never detects)");
            Ok(Box::new(StubBackend::new()))
        }
    }
}

fn open_source(cfg: &CaptureConfig) -> Result<Box<dyn FrameSource>> {
    if let Some(pattern) = &cfg.source.images {
        let source =
            ImageGlobSource::new(pattern).with_size(cfg.source.width, cfg.source.height);
        return Ok(Box::new(source));
    }

    let device = cfg
        .source
        .video_id
        .as_deref()
        .map(device_path_for_id)
        .unwrap_or_else(|| CameraConfig::default().device);
    let source = CameraSource::new(CameraConfig {
        device,
        width: cfg.source.width,
        height: cfg.source.height,
        target_fps: cfg.source.target_fps,
    })?;
    Ok(Box::new(source))
}
