//! Patterns: named sets of slots describing one valid assembly layout

pub mod loader;
pub mod wire;

pub use loader::PatternLoader;
pub use wire::PatternDef;

use crate::detection::Coords;
use crate::error::MatchError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

/// Accepted deviation around a desired center-size box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointToleranceSlot {
    pub class_id: u32,
    /// Desired `[x, y, w, h]`
    #[serde(alias = "positions")]
    pub position: Coords,
    /// Accepted absolute deviation per axis `[dx, dy, dw, dh]`
    #[serde(alias = "tolerances")]
    pub tolerance: Coords,
}

/// Corner band between a tight inner and a loose outer `xyxy` rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RectBandSlot {
    pub class_id: u32,
    pub inner: Coords,
    pub outer: Coords,
}

/// One expected object within a pattern
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Slot {
    PointTolerance(PointToleranceSlot),
    RectBand(RectBandSlot),
}

impl Slot {
    pub fn point(class_id: u32, position: Coords, tolerance: Coords) -> Self {
        Slot::PointTolerance(PointToleranceSlot {
            class_id,
            position,
            tolerance,
        })
    }

    pub fn band(class_id: u32, inner: Coords, outer: Coords) -> Self {
        Slot::RectBand(RectBandSlot {
            class_id,
            inner,
            outer,
        })
    }

    pub fn class_id(&self) -> u32 {
        match self {
            Slot::PointTolerance(slot) => slot.class_id,
            Slot::RectBand(slot) => slot.class_id,
        }
    }
}

/// Named, ordered sequence of slots
#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    pub name: String,
    pub slots: Vec<Slot>,
}

impl Pattern {
    pub fn new(name: impl Into<String>, slots: Vec<Slot>) -> Self {
        Self {
            name: name.into(),
            slots,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Patterns with unique names, kept in the order they were defined.
///
/// Iteration order decides ties between equally scored patterns, so it is
/// part of the library's meaning even though names are the lookup key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatternLibrary {
    patterns: Vec<Pattern>,
}

impl PatternLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_patterns<I>(patterns: I) -> Result<Self, MatchError>
    where
        I: IntoIterator<Item = Pattern>,
    {
        let mut library = Self::new();
        for pattern in patterns {
            library.insert(pattern)?;
        }
        Ok(library)
    }

    /// Append a pattern, rejecting a name that is already present
    pub fn insert(&mut self, pattern: Pattern) -> Result<(), MatchError> {
        if self.get(&pattern.name).is_some() {
            return Err(MatchError::DuplicatePattern(pattern.name));
        }
        self.patterns.push(pattern);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Pattern> {
        self.patterns.iter().find(|pattern| pattern.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(|pattern| pattern.name.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Pattern> {
        self.patterns.iter()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl<'a> IntoIterator for &'a PatternLibrary {
    type Item = &'a Pattern;
    type IntoIter = std::slice::Iter<'a, Pattern>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Pattern libraries keyed by the name of the file they were loaded from
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatternCatalog {
    libraries: BTreeMap<String, PatternLibrary>,
}

impl PatternCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the library stored under `key`
    pub fn insert(&mut self, key: impl Into<String>, library: PatternLibrary) -> Option<PatternLibrary> {
        self.libraries.insert(key.into(), library)
    }

    /// Look up a library by key. An exact match wins, otherwise keys are
    /// compared ignoring ASCII case.
    pub fn get(&self, key: &str) -> Result<&PatternLibrary, MatchError> {
        if let Some(library) = self.libraries.get(key) {
            return Ok(library);
        }

        self.libraries
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(key))
            .map(|(_, library)| library)
            .ok_or_else(|| MatchError::UnknownPatternKey {
                key: key.to_string(),
                available: self.keys().map(str::to_string).collect(),
            })
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_ok()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.libraries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.libraries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.libraries.is_empty()
    }

    /// Pick the key used when a request names none: the configured key if
    /// it exists, otherwise the first key of the catalog.
    pub fn resolve_default_key(&self, configured: Option<&str>) -> Result<String, MatchError> {
        match configured {
            Some(key) if self.contains_key(key) => Ok(key.to_string()),
            Some(key) => Err(MatchError::DefaultPatternMissing {
                key: key.to_string(),
            }),
            None => {
                let key = self.keys().next().ok_or(MatchError::NoDefaultPattern)?;
                info!("No default pattern key provided, using '{}'", key);
                Ok(key.to_string())
            }
        }
    }
}
