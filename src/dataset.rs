//! Dataset persistence.
//!
//! Each accepted capture produces a pair of JPEG files named by a shared,
//! monotonically increasing index:
//!
//! ```text
//! <root>/<dataset_name>/raw/<idx>.jpg
//! <root>/<dataset_name>/masks/<idx>.jpg
//! ```
//!
//! Indices start at 0 and are unpadded. Records are append-only; nothing in
//! this tool revisits or deduplicates them. Replacing an existing dataset is
//! destructive and therefore requires an explicit opt-in.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use image::RgbImage;

pub const RAW_DIR: &str = "raw";
pub const MASKS_DIR: &str = "masks";

/// Writer for one dataset's raw/mask pairs.
pub struct DatasetWriter {
    raw_dir: PathBuf,
    masks_dir: PathBuf,
    next_index: u64,
}

impl DatasetWriter {
    /// Create the dataset directories under `<root>/<name>`.
    ///
    /// When the dataset already exists: with `overwrite` its `raw/` and
    /// `masks/` directories are deleted and recreated before any write;
    /// without it, creation fails so no data is lost silently.
    pub fn create(root: &Path, name: &str, overwrite: bool) -> Result<Self> {
        if name.is_empty() || name.contains(std::path::is_separator) {
            return Err(anyhow!("invalid dataset name {:?}", name));
        }

        let dataset_dir = root.join(name);
        let raw_dir = dataset_dir.join(RAW_DIR);
        let masks_dir = dataset_dir.join(MASKS_DIR);

        for dir in [&raw_dir, &masks_dir] {
            if dir.exists() {
                if !overwrite {
                    return Err(anyhow!(
                        "dataset {:?} already exists at {}; pass --overwrite to replace it",
                        name,
                        dataset_dir.display()
                    ));
                }
                fs::remove_dir_all(dir)
                    .with_context(|| format!("clear dataset directory {}", dir.display()))?;
            }
            fs::create_dir_all(dir)
                .with_context(|| format!("create dataset directory {}", dir.display()))?;
        }

        Ok(Self {
            raw_dir,
            masks_dir,
            next_index: 0,
        })
    }

    /// Index the next accepted capture will be written under.
    pub fn next_index(&self) -> u64 {
        self.next_index
    }

    /// Persist one raw/mask pair and return its index.
    ///
    /// The index advances only after both files are written, keeping raw and
    /// mask filenames paired with no gaps.
    pub fn write_pair(&mut self, frame: &RgbImage, mask: &RgbImage) -> Result<u64> {
        let idx = self.next_index;
        let raw_path = self.raw_dir.join(format!("{}.jpg", idx));
        let mask_path = self.masks_dir.join(format!("{}.jpg", idx));

        frame
            .save(&raw_path)
            .with_context(|| format!("write raw frame {}", raw_path.display()))?;
        mask.save(&mask_path)
            .with_context(|| format!("write mask {}", mask_path.display()))?;

        self.next_index += 1;
        Ok(idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn frame() -> RgbImage {
        RgbImage::from_pixel(8, 8, image::Rgb([200, 100, 50]))
    }

    #[test]
    fn indices_are_paired_and_strictly_increasing() -> Result<()> {
        let root = TempDir::new()?;
        let mut writer = DatasetWriter::create(root.path(), "max", false)?;

        assert_eq!(writer.write_pair(&frame(), &frame())?, 0);
        assert_eq!(writer.write_pair(&frame(), &frame())?, 1);
        assert_eq!(writer.next_index(), 2);

        for idx in 0..2 {
            assert!(root.path().join(format!("max/raw/{}.jpg", idx)).is_file());
            assert!(root.path().join(format!("max/masks/{}.jpg", idx)).is_file());
        }
        Ok(())
    }

    #[test]
    fn refuses_existing_dataset_without_overwrite() -> Result<()> {
        let root = TempDir::new()?;
        let mut writer = DatasetWriter::create(root.path(), "max", false)?;
        writer.write_pair(&frame(), &frame())?;

        let err = DatasetWriter::create(root.path(), "max", false);
        assert!(err.is_err());
        // Refusal must not touch existing records
        assert!(root.path().join("max/raw/0.jpg").is_file());
        Ok(())
    }

    #[test]
    fn overwrite_clears_prior_contents_before_writing() -> Result<()> {
        let root = TempDir::new()?;
        let mut writer = DatasetWriter::create(root.path(), "max", false)?;
        writer.write_pair(&frame(), &frame())?;
        writer.write_pair(&frame(), &frame())?;

        let writer = DatasetWriter::create(root.path(), "max", true)?;
        assert_eq!(writer.next_index(), 0);
        assert!(!root.path().join("max/raw/0.jpg").exists());
        assert!(!root.path().join("max/masks/1.jpg").exists());
        Ok(())
    }

    #[test]
    fn rejects_path_like_dataset_names() {
        let root = TempDir::new().unwrap();
        assert!(DatasetWriter::create(root.path(), "", false).is_err());
        assert!(DatasetWriter::create(root.path(), "a/b", false).is_err());
    }
}
