//! Patcheck core data model
//!
//! Detections, slots, patterns and pattern libraries shared by the matching
//! engine and its collaborators.

pub mod detection;
pub mod error;
pub mod pattern;
pub mod result;

pub use detection::{BoxFormat, Coords, Detection};
pub use error::MatchError;
pub use pattern::{
    Pattern, PatternCatalog, PatternDef, PatternLibrary, PatternLoader, PointToleranceSlot,
    RectBandSlot, Slot,
};
pub use result::MatchResult;
