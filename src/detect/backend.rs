use anyhow::Result;
use image::RgbImage;

use crate::detect::result::Detection;

/// Instance-segmentation backend trait.
///
/// The backend owns the loaded model (and any accelerator memory behind it)
/// for the process lifetime. It is constructed once at startup and passed
/// explicitly into the capture loop, so tests can substitute a stub.
///
/// Implementations return detections in model output order; downstream
/// selection depends on that order and must not be re-sorted here.
pub trait DetectorBackend {
    /// Backend identifier.
    fn name(&self) -> &'static str;

    /// Run inference on a single RGB frame.
    ///
    /// Returns one `Detection` per model proposal: class label, confidence
    /// score, soft mask at frame resolution. An empty list is a normal
    /// outcome, not an error.
    fn detect(&mut self, frame: &RgbImage) -> Result<Vec<Detection>>;

    /// Optional warm-up hook.
    fn warm_up(&mut self) -> Result<()> {
        Ok(())
    }
}
