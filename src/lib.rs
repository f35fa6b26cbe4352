//! maskcap
//!
//! Interactive capture tool for building person-segmentation datasets.
//! Frames from a camera (or a glob of still images) are previewed one at a
//! time; on the capture key the frame is run through a pretrained instance
//! segmentation model, person masks are composited into an overlay, and the
//! raw frame plus overlay are written as a paired, indexed dataset record.
//!
//! # Module Structure
//!
//! - `ingest`: frame sources (V4L2 camera, still-image glob)
//! - `detect`: detector backends (tract ONNX, stub) and detection types
//! - `segment`: threshold cutoff, mask binarization, overlay compositing
//! - `capture`: the interactive loop tying source, detector, preview and
//!   writer together
//! - `dataset`: paired raw/mask JPEG persistence
//! - `preview`: display / key-wait seam (window, console, scripted)
//! - `config`: JSON config file and environment overrides
//! - `ui`: stage spinners for slow startup steps

pub mod capture;
pub mod config;
pub mod dataset;
pub mod detect;
pub mod ingest;
pub mod preview;
pub mod segment;
pub mod ui;

pub use capture::{run_capture, CaptureStats, CAPTURE_KEY};
pub use config::{CaptureConfig, SourceSettings};
pub use dataset::DatasetWriter;
pub use detect::{BinaryMask, Detection, DetectorBackend, SoftMask, StubBackend};
pub use ingest::{
    CameraConfig, CameraSource, FrameSource, ImageGlobSource, CAPTURE_HEIGHT, CAPTURE_WIDTH,
};
pub use preview::{ConsolePreview, Preview, ScriptedPreview};
pub use segment::{colorize_mask, instance_overlay, DEFAULT_THRESHOLD};
pub use ui::Ui;

#[cfg(feature = "backend-tract")]
pub use detect::TractBackend;
