//! Inspection requests and outcomes

pub mod service;

pub use service::InspectionService;

use patcheck_core::{MatchError, MatchResult, PatternDef, PatternLibrary, Slot};
use serde::{Deserialize, Serialize};

/// Name given to a single pattern sent inline without a name
pub const INLINE_PATTERN_NAME: &str = "inline";

/// A pattern check request: detections as parallel lists plus the library to
/// check against, either by key or inline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternRequest {
    pub coordinates: Vec<Vec<f64>>,
    pub class_ids: Vec<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<InlinePattern>,
}

/// Library supplied with the request instead of a catalog key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InlinePattern {
    Single(PatternDef),
    Library(PatternLibrary),
}

impl InlinePattern {
    pub fn into_library(self) -> Result<PatternLibrary, MatchError> {
        match self {
            InlinePattern::Single(def) => {
                PatternLibrary::from_patterns([def.into_pattern(INLINE_PATTERN_NAME)?])
            }
            InlinePattern::Library(library) => Ok(library),
        }
    }
}

/// What the caller gets back for one inspection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectionOutcome {
    pub decision: bool,
    pub pattern_name: String,
    pub slot_results: Vec<bool>,
}

impl InspectionOutcome {
    pub fn from_result(result: MatchResult, min_slots_for_decision: usize) -> Self {
        Self {
            decision: result.decision_with(min_slots_for_decision),
            pattern_name: result.pattern_name,
            slot_results: result.slot_results,
        }
    }

    /// Slots of the winning pattern in `library` that were not satisfied
    pub fn failed_slots(&self, library: &PatternLibrary) -> Vec<Slot> {
        MatchResult::new(self.pattern_name.clone(), self.slot_results.clone())
            .failed_slots(library)
            .into_iter()
            .copied()
            .collect()
    }
}
