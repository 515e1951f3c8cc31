//! Image-relative coordinates

use crate::Result;
use anyhow::{bail, Context};
use patcheck_core::Detection;
use std::path::Path;

/// Scaling between pixel and image-relative `[0, 1]` coordinates
pub struct ImageUtils;

impl ImageUtils {
    /// Width and height of an image file, read from its header
    pub fn dimensions<P: AsRef<Path>>(path: P) -> Result<(u32, u32)> {
        image::image_dimensions(&path)
            .with_context(|| format!("Failed to read image size: {:?}", path.as_ref()))
    }

    /// Divide every box by `(width, height, width, height)`.
    ///
    /// Works for both `xyxy` and `xywh` boxes since both scale per axis.
    pub fn to_relative(detections: &[Detection], width: u32, height: u32) -> Result<Vec<Detection>> {
        if width == 0 || height == 0 {
            bail!("Cannot scale to an empty image ({}x{})", width, height);
        }

        let (w, h) = (width as f64, height as f64);
        Ok(detections
            .iter()
            .map(|d| {
                let [a, b, c, e] = d.bbox;
                Detection::new(d.class_id, [a / w, b / h, c / w, e / h])
            })
            .collect())
    }

    /// Scale boxes to relative coordinates using the size of an image file
    pub fn to_relative_for_image<P: AsRef<Path>>(
        detections: &[Detection],
        path: P,
    ) -> Result<Vec<Detection>> {
        let (width, height) = Self::dimensions(path)?;
        Self::to_relative(detections, width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_relative() -> Result<()> {
        let detections = vec![Detection::new(1, [64.0, 48.0, 320.0, 240.0])];
        let relative = ImageUtils::to_relative(&detections, 640, 480)?;

        assert_eq!(relative[0], Detection::new(1, [0.1, 0.1, 0.5, 0.5]));
        Ok(())
    }

    #[test]
    fn test_to_relative_rejects_empty_image() {
        assert!(ImageUtils::to_relative(&[], 0, 480).is_err());
    }

    #[test]
    fn test_dimensions_from_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("frame.png");
        image::RgbImage::new(40, 20).save(&path)?;

        assert_eq!(ImageUtils::dimensions(&path)?, (40, 20));

        let relative =
            ImageUtils::to_relative_for_image(&[Detection::new(0, [10.0, 5.0, 20.0, 10.0])], &path)?;
        assert_eq!(relative[0].bbox, [0.25, 0.25, 0.5, 0.5]);
        Ok(())
    }
}
