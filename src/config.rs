use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use serde::Deserialize;

use crate::ingest::{CAPTURE_HEIGHT, CAPTURE_WIDTH};
use crate::segment::DEFAULT_THRESHOLD;

const DEFAULT_OUT_ROOT: &str = "out/datasets";

/// On-disk config shape (JSON, path via `MASKCAP_CONFIG`).
#[derive(Debug, Deserialize, Default)]
struct CaptureConfigFile {
    out_root: Option<String>,
    dataset_name: Option<String>,
    threshold: Option<f32>,
    model: Option<PathBuf>,
    source: Option<SourceConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
struct SourceConfigFile {
    video_id: Option<String>,
    images: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    target_fps: Option<u32>,
}

/// Resolved capture configuration.
///
/// Precedence, lowest to highest: built-in defaults, config file, `MASKCAP_*`
/// environment variables. CLI flags are merged on top by the binary.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    pub out_root: PathBuf,
    pub dataset_name: Option<String>,
    pub threshold: f32,
    pub model: Option<PathBuf>,
    pub source: SourceSettings,
}

#[derive(Debug, Clone)]
pub struct SourceSettings {
    /// Camera device index or path. Ignored when `images` is set.
    pub video_id: Option<String>,
    /// Still-image glob; takes precedence over the camera.
    pub images: Option<String>,
    pub width: u32,
    pub height: u32,
    pub target_fps: u32,
}

impl CaptureConfig {
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("MASKCAP_CONFIG").ok();
        let file_cfg = match config_path.as_deref() {
            Some(path) => read_config_file(Path::new(path))?,
            None => CaptureConfigFile::default(),
        };
        let mut cfg = Self::from_file(file_cfg);
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: CaptureConfigFile) -> Self {
        let source = file.source.unwrap_or_default();
        Self {
            out_root: file
                .out_root
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUT_ROOT)),
            dataset_name: file.dataset_name,
            threshold: file.threshold.unwrap_or(DEFAULT_THRESHOLD),
            model: file.model,
            source: SourceSettings {
                video_id: source.video_id,
                images: source.images,
                width: source.width.unwrap_or(CAPTURE_WIDTH),
                height: source.height.unwrap_or(CAPTURE_HEIGHT),
                target_fps: source.target_fps.unwrap_or(0),
            },
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(root) = std::env::var("MASKCAP_OUT_ROOT") {
            if !root.trim().is_empty() {
                self.out_root = PathBuf::from(root);
            }
        }
        if let Ok(name) = std::env::var("MASKCAP_DATASET_NAME") {
            if !name.trim().is_empty() {
                self.dataset_name = Some(name);
            }
        }
        if let Ok(video_id) = std::env::var("MASKCAP_VIDEO_ID") {
            if !video_id.trim().is_empty() {
                self.source.video_id = Some(video_id);
            }
        }
        if let Ok(images) = std::env::var("MASKCAP_IMAGES") {
            if !images.trim().is_empty() {
                self.source.images = Some(images);
            }
        }
        if let Ok(model) = std::env::var("MASKCAP_MODEL") {
            if !model.trim().is_empty() {
                self.model = Some(PathBuf::from(model));
            }
        }
        if let Ok(threshold) = std::env::var("MASKCAP_THRESHOLD") {
            self.threshold = threshold
                .parse()
                .map_err(|_| anyhow!("MASKCAP_THRESHOLD must be a number"))?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(anyhow!(
                "threshold must be within 0.0..=1.0, got {}",
                self.threshold
            ));
        }
        if self.source.width == 0 || self.source.height == 0 {
            return Err(anyhow!("source width and height must be non-zero"));
        }
        Ok(())
    }
}

fn read_config_file(path: &Path) -> Result<CaptureConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let cfg = serde_json::from_str(&raw)
        .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?;
    Ok(cfg)
}
