//! Slot matching and best-pattern selection

pub mod predicate;
pub mod selector;

pub use selector::{select_best_pattern, PatternSelector, SelectionReport};
