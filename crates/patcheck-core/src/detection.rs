//! Detections produced by the upstream object detector

use crate::error::MatchError;
use serde::{Deserialize, Serialize};

/// Four box coordinates. Whether they are `xyxy` or `xywh`, absolute or
/// image-relative, is fixed by the calling context.
pub type Coords = [f64; 4];

/// Coordinate convention of a batch of boxes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoxFormat {
    /// Infer `xyxy` vs `xywh` from the values (legacy behavior)
    #[default]
    Auto,
    /// Corner pair `[x1, y1, x2, y2]`
    Xyxy,
    /// Center and size `[x, y, w, h]`
    Xywh,
}

impl std::str::FromStr for BoxFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(BoxFormat::Auto),
            "xyxy" => Ok(BoxFormat::Xyxy),
            "xywh" => Ok(BoxFormat::Xywh),
            other => Err(format!("unknown box format '{other}' (expected auto, xyxy or xywh)")),
        }
    }
}

/// A classified bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub class_id: u32,
    #[serde(rename = "box")]
    pub bbox: Coords,
}

impl Detection {
    pub fn new(class_id: u32, bbox: Coords) -> Self {
        Self { class_id, bbox }
    }

    /// Zip parallel coordinate and class lists as received on the wire.
    pub fn from_parts(coordinates: &[Vec<f64>], class_ids: &[u32]) -> Result<Vec<Self>, MatchError> {
        if coordinates.len() != class_ids.len() {
            return Err(MatchError::LengthMismatch {
                boxes: coordinates.len(),
                class_ids: class_ids.len(),
            });
        }

        coordinates
            .iter()
            .zip(class_ids)
            .enumerate()
            .map(|(index, (coords, &class_id))| {
                let bbox: Coords = coords.as_slice().try_into().map_err(|_| {
                    MatchError::MalformedBox {
                        index,
                        len: coords.len(),
                    }
                })?;
                Ok(Self::new(class_id, bbox))
            })
            .collect()
    }
}
