//! V4L2 camera frame source.
//!
//! `CameraSource` captures frames from a local device node (e.g.
//! /dev/video0). Synthetic `stub://` sources are always available; real
//! devices need the ingest-v4l2 feature.
//!
//! Open failures are reported to the caller, who logs them and keeps going;
//! an unopened device behaves as an already-exhausted stream. That mirrors
//! the historical capture tool, which printed a message on open failure and
//! fell through into its read loop.

use anyhow::{anyhow, Result};
use image::RgbImage;

#[cfg(feature = "ingest-v4l2")]
use anyhow::Context;

use super::{FrameSource, CAPTURE_HEIGHT, CAPTURE_WIDTH};

/// Configuration for a camera source.
#[derive(Clone, Debug)]
pub struct CameraConfig {
    /// Device path (e.g., "/dev/video0") or `stub://` name.
    pub device: String,
    /// Preferred frame width.
    pub width: u32,
    /// Preferred frame height.
    pub height: u32,
    /// Target frame rate. Zero leaves the driver default in place.
    pub target_fps: u32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            device: "/dev/video0".to_string(),
            width: CAPTURE_WIDTH,
            height: CAPTURE_HEIGHT,
            target_fps: 0,
        }
    }
}

/// Map a CLI video id to a device path. Bare integers become /dev/video<N>;
/// anything else is taken as a path or stream identifier verbatim.
pub fn device_path_for_id(video_id: &str) -> String {
    if video_id.chars().all(|c| c.is_ascii_digit()) && !video_id.is_empty() {
        format!("/dev/video{}", video_id)
    } else {
        video_id.to_string()
    }
}

/// Camera frame source.
pub struct CameraSource {
    backend: CameraBackend,
}

enum CameraBackend {
    Synthetic(SyntheticCameraSource),
    #[cfg(feature = "ingest-v4l2")]
    Device(DeviceCameraSource),
}

impl CameraSource {
    pub fn new(config: CameraConfig) -> Result<Self> {
        if config.device.starts_with("stub://") {
            Ok(Self {
                backend: CameraBackend::Synthetic(SyntheticCameraSource::new(config)),
            })
        } else {
            #[cfg(feature = "ingest-v4l2")]
            {
                Ok(Self {
                    backend: CameraBackend::Device(DeviceCameraSource::new(config)),
                })
            }
            #[cfg(not(feature = "ingest-v4l2"))]
            {
                Err(anyhow!(
                    "camera device {} requires the ingest-v4l2 feature",
                    config.device
                ))
            }
        }
    }
}

impl FrameSource for CameraSource {
    fn connect(&mut self) -> Result<()> {
        match &mut self.backend {
            CameraBackend::Synthetic(source) => source.connect(),
            #[cfg(feature = "ingest-v4l2")]
            CameraBackend::Device(source) => source.connect(),
        }
    }

    fn next_frame(&mut self) -> Result<Option<RgbImage>> {
        match &mut self.backend {
            CameraBackend::Synthetic(source) => source.next_frame(),
            #[cfg(feature = "ingest-v4l2")]
            CameraBackend::Device(source) => source.next_frame(),
        }
    }
}

// ----------------------------------------------------------------------------
// Synthetic source (stub://) for tests and demos
// ----------------------------------------------------------------------------

struct SyntheticCameraSource {
    config: CameraConfig,
    frame_count: u64,
}

impl SyntheticCameraSource {
    fn new(config: CameraConfig) -> Self {
        Self {
            config,
            frame_count: 0,
        }
    }

    fn connect(&mut self) -> Result<()> {
        log::info!("CameraSource: connected to {} (synthetic)", self.config.device);
        Ok(())
    }

    fn next_frame(&mut self) -> Result<Option<RgbImage>> {
        self.frame_count += 1;
        let (width, height) = (self.config.width, self.config.height);
        let count = self.frame_count;
        let frame = RgbImage::from_fn(width, height, |x, y| {
            let v = ((x as u64 + y as u64 + count) % 256) as u8;
            image::Rgb([v, v, v])
        });
        Ok(Some(frame))
    }
}

// ----------------------------------------------------------------------------
// Real device via libv4l
// ----------------------------------------------------------------------------

#[cfg(feature = "ingest-v4l2")]
struct DeviceCameraSource {
    config: CameraConfig,
    state: Option<DeviceCameraState>,
    active_width: u32,
    active_height: u32,
    active_format: super::normalize::PixelFormat,
}

#[cfg(feature = "ingest-v4l2")]
#[ouroboros::self_referencing]
struct DeviceCameraState {
    device: v4l::Device,
    #[borrows(mut device)]
    #[covariant]
    stream: v4l::prelude::MmapStream<'this, v4l::Device>,
}

#[cfg(feature = "ingest-v4l2")]
impl DeviceCameraSource {
    fn new(config: CameraConfig) -> Self {
        Self {
            active_width: config.width,
            active_height: config.height,
            active_format: super::normalize::PixelFormat::Rgb24,
            config,
            state: None,
        }
    }

    fn connect(&mut self) -> Result<()> {
        use v4l::buffer::Type;
        use v4l::video::Capture;

        let mut device = v4l::Device::with_path(&self.config.device)
            .with_context(|| format!("open v4l2 device {}", self.config.device))?;
        let mut format = device.format().context("read v4l2 format")?;
        format.width = self.config.width;
        format.height = self.config.height;
        format.fourcc = v4l::FourCC::new(b"RGB3");

        let format = match device.set_format(&format) {
            Ok(format) => format,
            Err(err) => {
                log::warn!(
                    "CameraSource: failed to set format on {}: {}",
                    self.config.device,
                    err
                );
                device
                    .format()
                    .context("read v4l2 format after set failure")?
            }
        };

        if self.config.target_fps > 0 {
            let params = v4l::video::capture::Parameters::with_fps(self.config.target_fps);
            if let Err(err) = device.set_params(&params) {
                log::warn!(
                    "CameraSource: failed to set fps on {}: {}",
                    self.config.device,
                    err
                );
            }
        }

        self.active_width = format.width;
        self.active_height = format.height;
        self.active_format = super::normalize::PixelFormat::from_fourcc(&format.fourcc.repr)
            .ok_or_else(|| {
                anyhow!(
                    "unsupported pixel format {} on {}",
                    format.fourcc,
                    self.config.device
                )
            })?;

        let state = DeviceCameraStateBuilder {
            device,
            stream_builder: |device| {
                v4l::prelude::MmapStream::with_buffers(device, Type::VideoCapture, 4)
                    .map_err(|err| anyhow::Error::new(err).context("create v4l2 buffer stream"))
            },
        }
        .try_build()?;
        self.state = Some(state);

        log::info!(
            "CameraSource: connected to {} ({}x{})",
            self.config.device,
            self.active_width,
            self.active_height
        );
        Ok(())
    }

    fn next_frame(&mut self) -> Result<Option<RgbImage>> {
        use v4l::io::traits::CaptureStream;

        // An unopened device reads as end-of-stream, not an error.
        let Some(state) = self.state.as_mut() else {
            return Ok(None);
        };

        let (buf, _meta) = state
            .with_mut(|fields| fields.stream.next())
            .map_err(|err| anyhow::Error::new(err).context("capture v4l2 frame"))?;

        let rgb = super::normalize::normalize_to_rgb(
            buf,
            self.active_width,
            self.active_height,
            self.active_format,
        )?;
        let frame = RgbImage::from_vec(self.active_width, self.active_height, rgb)
            .ok_or_else(|| anyhow!("normalized frame did not fill {}x{}", self.active_width, self.active_height))?;
        Ok(Some(frame))
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthetic_camera_produces_frames_at_configured_size() -> Result<()> {
        let mut source = CameraSource::new(CameraConfig {
            device: "stub://test".to_string(),
            ..CameraConfig::default()
        })?;
        source.connect()?;

        let frame = source.next_frame()?.expect("synthetic frame");
        assert_eq!(frame.dimensions(), (CAPTURE_WIDTH, CAPTURE_HEIGHT));
        Ok(())
    }

    #[test]
    fn numeric_video_ids_map_to_device_nodes() {
        assert_eq!(device_path_for_id("4"), "/dev/video4");
        assert_eq!(device_path_for_id("/dev/video2"), "/dev/video2");
        assert_eq!(device_path_for_id("stub://cam"), "stub://cam");
    }
}
