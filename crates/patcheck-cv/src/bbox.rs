//! Bounding box normalization
//!
//! Detections arrive either as corner pairs (`xyxy`) or as center and size
//! (`xywh`). Each box is resolved into both forms once per call so that every
//! slot predicate can read the convention it needs.

use patcheck_core::{BoxFormat, Coords, Detection};
use serde::{Deserialize, Serialize};

/// Convert `[x1, y1, x2, y2]` to `[x_center, y_center, w, h]`
pub fn xyxy_to_xywh([x1, y1, x2, y2]: Coords) -> Coords {
    let w = x2 - x1;
    let h = y2 - y1;
    [x1 + w / 2.0, y1 + h / 2.0, w, h]
}

/// Convert `[x_center, y_center, w, h]` to `[x1, y1, x2, y2]`
pub fn xywh_to_xyxy([x, y, w, h]: Coords) -> Coords {
    [x - w / 2.0, y - h / 2.0, x + w / 2.0, y + h / 2.0]
}

/// Legacy heuristic: the whole batch is taken as corner pairs as soon as one
/// box has `x1 < x2` or `y1 < y2`.
///
/// A genuine center-size box with a center left of its width (or above its
/// height) also passes this test and is then misread.
pub fn looks_like_xyxy<'a, I>(boxes: I) -> bool
where
    I: IntoIterator<Item = &'a Coords>,
{
    boxes
        .into_iter()
        .any(|&[a, b, c, d]| a < c || b < d)
}

/// A detection resolved into both coordinate conventions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub class_id: u32,
    pub xywh: Coords,
    pub xyxy: Coords,
}

impl BBox {
    pub fn from_xyxy(class_id: u32, xyxy: Coords) -> Self {
        Self {
            class_id,
            xywh: xyxy_to_xywh(xyxy),
            xyxy,
        }
    }

    pub fn from_xywh(class_id: u32, xywh: Coords) -> Self {
        Self {
            class_id,
            xywh,
            xyxy: xywh_to_xyxy(xywh),
        }
    }
}

/// Normalized detections for a single matching call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BBoxCollection {
    boxes: Vec<BBox>,
}

impl BBoxCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_vec(boxes: Vec<BBox>) -> Self {
        Self { boxes }
    }

    /// Resolve detections declared in `format` into both conventions.
    ///
    /// With [`BoxFormat::Auto`] the center-size form follows the legacy
    /// heuristic over the whole batch, while the corner form is the raw input
    /// unchanged: rectangle-band slots always expect callers to send `xyxy`.
    pub fn normalize(detections: &[Detection], format: BoxFormat) -> Self {
        let boxes = match format {
            BoxFormat::Xyxy => detections
                .iter()
                .map(|d| BBox::from_xyxy(d.class_id, d.bbox))
                .collect(),
            BoxFormat::Xywh => detections
                .iter()
                .map(|d| BBox::from_xywh(d.class_id, d.bbox))
                .collect(),
            BoxFormat::Auto => {
                let corner_pairs = looks_like_xyxy(detections.iter().map(|d| &d.bbox));
                detections
                    .iter()
                    .map(|d| BBox {
                        class_id: d.class_id,
                        xywh: if corner_pairs {
                            xyxy_to_xywh(d.bbox)
                        } else {
                            d.bbox
                        },
                        xyxy: d.bbox,
                    })
                    .collect()
            }
        };

        Self { boxes }
    }

    pub fn as_slice(&self) -> &[BBox] {
        &self.boxes
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BBox> {
        self.boxes.iter()
    }
}

impl<'a> IntoIterator for &'a BBoxCollection {
    type Item = &'a BBox;
    type IntoIter = std::slice::Iter<'a, BBox>;

    fn into_iter(self) -> Self::IntoIter {
        self.boxes.iter()
    }
}

impl FromIterator<BBox> for BBoxCollection {
    fn from_iter<T: IntoIterator<Item = BBox>>(iter: T) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}
