//! Outcome of matching one set of detections against a pattern library

use crate::pattern::{PatternLibrary, Slot};
use serde::{Deserialize, Serialize};

/// Minimum number of slots a winning pattern needs before it can accept a part
pub const MIN_SLOTS_FOR_DECISION: usize = 2;

/// Best pattern and which of its slots were satisfied.
///
/// `slot_results[i]` belongs to slot `i` of the pattern named `pattern_name`.
/// When no pattern scored, the name and the vector are both empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub pattern_name: String,
    pub slot_results: Vec<bool>,
}

impl MatchResult {
    pub fn new(pattern_name: impl Into<String>, slot_results: Vec<bool>) -> Self {
        Self {
            pattern_name: pattern_name.into(),
            slot_results,
        }
    }

    /// No pattern matched any slot
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.pattern_name.is_empty()
    }

    pub fn matched_count(&self) -> usize {
        self.slot_results.iter().filter(|&&found| found).count()
    }

    pub fn all_matched(&self) -> bool {
        !self.slot_results.is_empty() && self.slot_results.iter().all(|&found| found)
    }

    /// Accept the part: more than one slot and every slot satisfied
    pub fn decision(&self) -> bool {
        self.decision_with(MIN_SLOTS_FOR_DECISION)
    }

    pub fn decision_with(&self, min_slots: usize) -> bool {
        self.slot_results.len() >= min_slots && self.all_matched()
    }

    /// Slots of the winning pattern that no detection satisfied
    pub fn failed_slots<'a>(&self, library: &'a PatternLibrary) -> Vec<&'a Slot> {
        let Some(pattern) = library.get(&self.pattern_name) else {
            return Vec::new();
        };

        pattern
            .slots
            .iter()
            .zip(&self.slot_results)
            .filter(|(_, found)| !**found)
            .map(|(slot, _)| slot)
            .collect()
    }
}
