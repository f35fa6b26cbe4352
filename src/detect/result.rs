use anyhow::{anyhow, Result};

use crate::detect::labels;

/// Per-pixel mask probabilities at frame resolution, row-major.
#[derive(Clone, Debug)]
pub struct SoftMask {
    width: u32,
    height: u32,
    data: Vec<f32>,
}

impl SoftMask {
    pub fn new(width: u32, height: u32, data: Vec<f32>) -> Result<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .ok_or_else(|| anyhow!("mask dimensions overflow"))?;
        if data.len() != expected {
            return Err(anyhow!(
                "mask length mismatch: expected {} probabilities for {}x{}, got {}",
                expected,
                width,
                height,
                data.len()
            ));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Threshold probabilities into a {0,1} mask.
    pub fn binarize(&self, prob: f32) -> BinaryMask {
        BinaryMask {
            width: self.width,
            height: self.height,
            data: self.data.iter().map(|&p| u8::from(p > prob)).collect(),
        }
    }
}

/// Binary instance mask, values in {0,1}, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BinaryMask {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl BinaryMask {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .ok_or_else(|| anyhow!("mask dimensions overflow"))?;
        if data.len() != expected {
            return Err(anyhow!(
                "mask length mismatch: expected {} values for {}x{}, got {}",
                expected,
                width,
                height,
                data.len()
            ));
        }
        if let Some(v) = data.iter().find(|&&v| v > 1) {
            return Err(anyhow!("binary mask contains non-binary value {}", v));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn values(&self) -> &[u8] {
        &self.data
    }
}

/// A single model detection: class label, confidence, soft mask.
///
/// Detections are kept in model output order. Mask R-CNN happens to sort by
/// score, but nothing downstream may rely on that.
#[derive(Clone, Debug)]
pub struct Detection {
    pub label: u32,
    pub score: f32,
    pub mask: SoftMask,
}

impl Detection {
    pub fn class_name(&self) -> Option<&'static str> {
        labels::class_name(self.label)
    }

    pub fn is_person(&self) -> bool {
        self.class_name() == Some(labels::PERSON)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn soft_mask_rejects_length_mismatch() {
        assert!(SoftMask::new(2, 2, vec![0.0; 3]).is_err());
    }

    #[test]
    fn binarize_thresholds_at_given_probability() -> Result<()> {
        let mask = SoftMask::new(2, 2, vec![0.1, 0.5, 0.51, 0.9])?;
        let binary = mask.binarize(0.5);
        assert_eq!(binary.values(), &[0, 0, 1, 1]);
        Ok(())
    }

    #[test]
    fn binary_mask_rejects_non_binary_values() {
        assert!(BinaryMask::new(1, 2, vec![0, 2]).is_err());
    }

    #[test]
    fn detection_class_lookup() -> Result<()> {
        let mask = SoftMask::new(1, 1, vec![1.0])?;
        let person = Detection {
            label: 1,
            score: 0.9,
            mask: mask.clone(),
        };
        let dog = Detection {
            label: 18,
            score: 0.9,
            mask,
        };
        assert!(person.is_person());
        assert_eq!(dog.class_name(), Some("dog"));
        assert!(!dog.is_person());
        Ok(())
    }
}
