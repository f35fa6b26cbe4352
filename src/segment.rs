//! Segmentation post-processing.
//!
//! Turns a raw detection list into the mask overlay persisted next to each
//! captured frame:
//! 1. pick the cutoff index (last detection scoring above the threshold, in
//!    model output order),
//! 2. binarize soft masks at 0.5,
//! 3. truncate to the cutoff, then keep only "person" masks,
//! 4. compound each retained mask onto the frame as a half-weight white
//!    overlay.
//!
//! The cutoff is positional, not a pure score filter: detections before the
//! last above-threshold entry are scanned even when their own score is below
//! the threshold. That selection rule is load-bearing for which masks end up
//! in the dataset and is kept as-is; see DESIGN.md.

use image::RgbImage;

use crate::detect::{BinaryMask, Detection};

/// Default confidence threshold for a detection to count as "found".
pub const DEFAULT_THRESHOLD: f32 = 0.5;

/// Probability cutoff when binarizing soft masks.
const MASK_BINARIZE_PROB: f32 = 0.5;

/// Blend weight for each compounded mask layer.
const OVERLAY_ALPHA: f32 = 0.5;

/// Index of the last detection whose score exceeds `threshold`, scanning in
/// model output order. `None` when nothing scores above the threshold.
pub fn cutoff_index(detections: &[Detection], threshold: f32) -> Option<usize> {
    detections.iter().rposition(|d| d.score > threshold)
}

/// Binary "person" masks retained by the cutoff rule.
///
/// `None` means no detection exceeded the threshold at all. `Some(vec![])` is
/// a normal outcome: the cutoff retained detections, none of them a person.
pub fn person_masks(detections: &[Detection], threshold: f32) -> Option<Vec<BinaryMask>> {
    let cutoff = cutoff_index(detections, threshold)?;
    Some(
        detections[..=cutoff]
            .iter()
            .filter(|d| d.is_person())
            .map(|d| d.mask.binarize(MASK_BINARIZE_PROB))
            .collect(),
    )
}

/// Render a binary mask as white-on-black, three channels.
pub fn colorize_mask(mask: &BinaryMask) -> RgbImage {
    let mut out = RgbImage::new(mask.width(), mask.height());
    for (value, pixel) in mask.values().iter().zip(out.pixels_mut()) {
        if *value == 1 {
            *pixel = image::Rgb([255, 255, 255]);
        }
    }
    out
}

/// Saturating per-channel blend: `base + alpha * layer`.
///
/// Dimensions must match; a mismatch is a programming error and aborts.
fn blend_onto(base: &mut RgbImage, layer: &RgbImage, alpha: f32) {
    assert_eq!(
        base.dimensions(),
        layer.dimensions(),
        "overlay blend requires matching dimensions"
    );
    for (dst, src) in base.pixels_mut().zip(layer.pixels()) {
        for c in 0..3 {
            let blended = dst[c] as f32 + alpha * src[c] as f32;
            dst[c] = blended.round().clamp(0.0, 255.0) as u8;
        }
    }
}

/// Build the overlay image for one frame.
///
/// Each retained person mask is colorized and blended onto the frame in turn,
/// compounding on the previous result. Returns `None` when no detection
/// exceeded the threshold; a retained-but-personless cutoff yields the frame
/// unchanged.
pub fn instance_overlay(
    frame: &RgbImage,
    detections: &[Detection],
    threshold: f32,
) -> Option<RgbImage> {
    let masks = person_masks(detections, threshold)?;
    let mut overlay = frame.clone();
    for mask in &masks {
        let layer = colorize_mask(mask);
        blend_onto(&mut overlay, &layer, OVERLAY_ALPHA);
    }
    Some(overlay)
}
