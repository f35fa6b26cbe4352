#![cfg(feature = "backend-tract")]

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use image::RgbImage;
use tract_onnx::prelude::*;

use crate::detect::backend::DetectorBackend;
use crate::detect::result::{Detection, SoftMask};

/// Tract-based backend running a Mask R-CNN ONNX export.
///
/// The export is expected to follow torchvision output ordering:
/// boxes `[N,4]`, labels `[N]` (i64), scores `[N]`, masks `[N,1,H,W]` with
/// per-pixel probabilities at input resolution. Inference runs on CPU; no
/// network I/O happens after model loading.
pub struct TractBackend {
    model: TypedSimplePlan<TypedModel>,
    width: u32,
    height: u32,
}

impl TractBackend {
    /// Load an ONNX model from disk and prepare it for inference.
    pub fn new<P: AsRef<Path>>(model_path: P, width: u32, height: u32) -> Result<Self> {
        let model_path = model_path.as_ref();
        let model = tract_onnx::onnx()
            .model_for_path(model_path)
            .with_context(|| format!("failed to load ONNX model from {}", model_path.display()))?
            .with_input_fact(
                0,
                InferenceFact::dt_shape(
                    f32::datum_type(),
                    tvec!(1, 3, height as usize, width as usize),
                ),
            )
            .context("failed to set input fact")?
            .into_optimized()
            .context("failed to optimize ONNX model")?
            .into_runnable()
            .context("failed to build runnable ONNX model")?;

        Ok(Self {
            model,
            width,
            height,
        })
    }

    fn build_input(&self, frame: &RgbImage) -> Result<Tensor> {
        let (width, height) = frame.dimensions();
        if width != self.width || height != self.height {
            return Err(anyhow!(
                "frame size {}x{} does not match model input {}x{}",
                width,
                height,
                self.width,
                self.height
            ));
        }

        let input = tract_ndarray::Array4::from_shape_fn(
            (1, 3, height as usize, width as usize),
            |(_, channel, y, x)| frame.get_pixel(x as u32, y as u32)[channel] as f32 / 255.0,
        );

        Ok(input.into_tensor())
    }

    fn parse_outputs(&self, outputs: TVec<TValue>) -> Result<Vec<Detection>> {
        if outputs.len() < 4 {
            return Err(anyhow!(
                "model produced {} outputs, expected boxes/labels/scores/masks",
                outputs.len()
            ));
        }

        let labels: Vec<i64> = outputs[1]
            .to_array_view::<i64>()
            .context("label output tensor was not i64")?
            .iter()
            .copied()
            .collect();
        let scores: Vec<f32> = outputs[2]
            .to_array_view::<f32>()
            .context("score output tensor was not f32")?
            .iter()
            .copied()
            .collect();
        let masks = outputs[3]
            .to_array_view::<f32>()
            .context("mask output tensor was not f32")?;

        if masks.ndim() != 4 {
            return Err(anyhow!(
                "mask output has {} dimensions, expected [N,1,H,W]",
                masks.ndim()
            ));
        }

        let count = scores.len();
        if labels.len() != count || masks.shape()[0] != count {
            return Err(anyhow!(
                "output cardinality mismatch: {} scores, {} labels, {} masks",
                count,
                labels.len(),
                masks.shape()[0]
            ));
        }

        let mut detections = Vec::with_capacity(count);
        for n in 0..count {
            let label = u32::try_from(labels[n])
                .map_err(|_| anyhow!("model emitted negative label {}", labels[n]))?;
            let plane = masks.index_axis(tract_ndarray::Axis(0), n);
            let plane = plane.index_axis(tract_ndarray::Axis(0), 0);
            let (mask_h, mask_w) = (plane.shape()[0] as u32, plane.shape()[1] as u32);
            if mask_w != self.width || mask_h != self.height {
                return Err(anyhow!(
                    "mask resolution {}x{} does not match model input {}x{}",
                    mask_w,
                    mask_h,
                    self.width,
                    self.height
                ));
            }
            let mask = SoftMask::new(mask_w, mask_h, plane.iter().copied().collect())?;
            detections.push(Detection {
                label,
                score: scores[n],
                mask,
            });
        }

        Ok(detections)
    }
}

impl DetectorBackend for TractBackend {
    fn name(&self) -> &'static str {
        "tract"
    }

    fn detect(&mut self, frame: &RgbImage) -> Result<Vec<Detection>> {
        let input = self.build_input(frame)?;
        let outputs = self
            .model
            .run(tvec!(input.into()))
            .context("ONNX inference failed")?;
        self.parse_outputs(outputs)
    }

    fn warm_up(&mut self) -> Result<()> {
        let blank = RgbImage::new(self.width, self.height);
        self.detect(&blank).map(|_| ())
    }
}
