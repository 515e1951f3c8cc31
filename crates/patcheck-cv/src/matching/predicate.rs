//! Slot predicates: does one detection satisfy one slot?

use crate::bbox::BBox;
use crate::traits::SlotPredicate;
use patcheck_core::{PointToleranceSlot, RectBandSlot, Slot};

impl SlotPredicate for PointToleranceSlot {
    /// Same class and, on each axis `x, y, w, h`, a deviation strictly
    /// below the tolerance. Stops at the first failing axis.
    fn satisfied_by(&self, bbox: &BBox) -> bool {
        bbox.class_id == self.class_id
            && bbox
                .xywh
                .iter()
                .zip(&self.position)
                .zip(&self.tolerance)
                .all(|((actual, desired), tolerance)| (actual - desired).abs() < *tolerance)
    }
}

impl SlotPredicate for RectBandSlot {
    /// Same class and every corner coordinate inside the closed interval
    /// between its inner and outer bound. The top-left corner may move out
    /// towards `outer`, the bottom-right corner likewise.
    fn satisfied_by(&self, bbox: &BBox) -> bool {
        let [x1, y1, x2, y2] = bbox.xyxy;
        let [inner_x1, inner_y1, inner_x2, inner_y2] = self.inner;
        let [outer_x1, outer_y1, outer_x2, outer_y2] = self.outer;

        bbox.class_id == self.class_id
            && (outer_x1..=inner_x1).contains(&x1)
            && (outer_y1..=inner_y1).contains(&y1)
            && (inner_x2..=outer_x2).contains(&x2)
            && (inner_y2..=outer_y2).contains(&y2)
    }
}

impl SlotPredicate for Slot {
    fn satisfied_by(&self, bbox: &BBox) -> bool {
        match self {
            Slot::PointTolerance(slot) => slot.satisfied_by(bbox),
            Slot::RectBand(slot) => slot.satisfied_by(bbox),
        }
    }
}
