use thiserror::Error;

/// Misuse of the matching engine. A pattern that does not match is never an error.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MatchError {
    #[error("pattern key '{key}' not found (available: {available:?})")]
    UnknownPatternKey { key: String, available: Vec<String> },

    #[error("got {boxes} boxes but {class_ids} class ids")]
    LengthMismatch { boxes: usize, class_ids: usize },

    #[error("box {index} has {len} coordinates, expected 4")]
    MalformedBox { index: usize, len: usize },

    #[error("position {index} has {len} values, expected [class_id, x, y, w, h]")]
    MalformedPosition { index: usize, len: usize },

    #[error("position {index} has class id {value}, expected a non-negative integer")]
    MalformedClassId { index: usize, value: f64 },

    #[error("duplicate pattern name '{0}'")]
    DuplicatePattern(String),

    #[error("no pattern library available to use as default")]
    NoDefaultPattern,

    #[error("default pattern '{key}' not found")]
    DefaultPatternMissing { key: String },
}
