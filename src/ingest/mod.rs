//! Frame ingestion sources.
//!
//! Two sources feed the capture loop:
//! - `camera`: V4L2 devices (feature: ingest-v4l2), with a `stub://`
//!   synthetic source always available for tests and demos
//! - `images`: a glob of still images, resized to the capture resolution
//!
//! Sources produce RGB8 frames one at a time and signal end-of-stream with
//! `Ok(None)`; the capture loop terminates normally on that. Frames are
//! ephemeral and never retained past one loop iteration.

pub mod camera;
pub mod images;
#[cfg(feature = "ingest-v4l2")]
mod normalize;

pub use camera::{CameraConfig, CameraSource};
pub use images::ImageGlobSource;

use anyhow::Result;
use image::RgbImage;

/// Default capture resolution, also the resize target for still images.
pub const CAPTURE_WIDTH: u32 = 640;
pub const CAPTURE_HEIGHT: u32 = 480;

/// A blocking sequence of frames.
pub trait FrameSource {
    /// Open the underlying device or file set.
    fn connect(&mut self) -> Result<()>;

    /// Capture the next frame. `Ok(None)` means the source is exhausted.
    fn next_frame(&mut self) -> Result<Option<RgbImage>>;
}
