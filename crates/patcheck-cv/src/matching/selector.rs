//! Best-pattern selection
//!
//! Every slot of every pattern is checked against the detections with a
//! first-match scan. A pattern replaces the current best only with a
//! strictly higher number of satisfied slots, so among equal scores the
//! pattern defined first wins. Scanning stops at the first pattern whose
//! slots are all satisfied.

use crate::bbox::BBoxCollection;
use crate::traits::SlotPredicate;
use patcheck_core::{BoxFormat, Detection, MatchResult, PatternLibrary};
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, trace};

/// Selection result with timing and how many patterns were looked at
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionReport {
    pub result: MatchResult,
    pub patterns_evaluated: usize,
    pub elapsed_us: u64,
}

/// Selects the best matching pattern of a library
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternSelector {
    box_format: BoxFormat,
}

impl PatternSelector {
    pub fn new(box_format: BoxFormat) -> Self {
        Self { box_format }
    }

    pub fn box_format(&self) -> BoxFormat {
        self.box_format
    }

    /// Normalize detections once, then pick the best pattern
    pub fn select(&self, detections: &[Detection], library: &PatternLibrary) -> SelectionReport {
        let start = Instant::now();

        let boxes = BBoxCollection::normalize(detections, self.box_format);
        let (result, patterns_evaluated) = self.select_normalized(&boxes, library);

        let elapsed_us = start.elapsed().as_micros() as u64;
        debug!(
            "select(): pattern_name={:?}, slot_results={:?}; {} of {} pattern(s) evaluated in {}us",
            result.pattern_name,
            result.slot_results,
            patterns_evaluated,
            library.len(),
            elapsed_us
        );

        SelectionReport {
            result,
            patterns_evaluated,
            elapsed_us,
        }
    }

    /// Pick the best pattern for already normalized boxes. Also returns the
    /// number of patterns evaluated before the scan stopped.
    pub fn select_normalized(
        &self,
        boxes: &BBoxCollection,
        library: &PatternLibrary,
    ) -> (MatchResult, usize) {
        let mut best = MatchResult::empty();
        let mut best_count = 0;
        let mut evaluated = 0;

        for pattern in library {
            evaluated += 1;

            let slot_results = evaluate_slots(&pattern.slots, boxes);
            let count = slot_results.iter().filter(|&&found| found).count();
            trace!("pattern '{}': {}/{} slots", pattern.name, count, slot_results.len());

            if count > best_count {
                best_count = count;
                best = MatchResult::new(pattern.name.clone(), slot_results);

                if best.all_matched() {
                    break;
                }
            }
        }

        (best, evaluated)
    }
}

/// For each slot, whether any box satisfies it. The scan per slot stops at
/// the first satisfying box and one box may satisfy several slots.
pub fn evaluate_slots<S: SlotPredicate>(slots: &[S], boxes: &BBoxCollection) -> Vec<bool> {
    slots
        .iter()
        .map(|slot| boxes.iter().any(|bbox| slot.satisfied_by(bbox)))
        .collect()
}

/// Select with the legacy coordinate heuristic
pub fn select_best_pattern(detections: &[Detection], library: &PatternLibrary) -> MatchResult {
    PatternSelector::default().select(detections, library).result
}
