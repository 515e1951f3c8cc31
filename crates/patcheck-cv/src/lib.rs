//! Patcheck matching engine
//!
//! Decides whether a set of detections matches one of several reference
//! patterns and reports per-slot results plus an overall decision.

pub mod bbox;
pub mod config;
pub mod inspection;
pub mod matching;
pub mod store;
pub mod utils;

// Re-export commonly used types
pub use bbox::{BBox, BBoxCollection};
pub use config::InspectionConfig;
pub use inspection::{InspectionOutcome, InspectionService, PatternRequest};
pub use matching::{select_best_pattern, PatternSelector, SelectionReport};
pub use store::PatternStore;

// Error handling
pub type Result<T> = anyhow::Result<T>;

/// Core traits for the matching engine
pub mod traits {
    use super::*;

    /// A geometric and class constraint that one detection can satisfy
    pub trait SlotPredicate {
        fn satisfied_by(&self, bbox: &BBox) -> bool;
    }
}
