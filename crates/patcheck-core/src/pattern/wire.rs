//! Serialized form of patterns and libraries
//!
//! A library is a map from pattern name to pattern definition. A definition
//! is either a list of slots or the compact form
//! `{positions: [[class_id, x, y, w, h], ...], tolerance: [dx, dy, dw, dh]}`
//! where one tolerance applies to every position.

use super::{Pattern, PatternLibrary, Slot};
use crate::detection::Coords;
use crate::error::MatchError;
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Definition of a single pattern as found in a pattern file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PatternDef {
    Slots(Vec<Slot>),
    Compact {
        positions: Vec<Vec<f64>>,
        #[serde(alias = "tolerances")]
        tolerance: Coords,
    },
}

impl PatternDef {
    pub fn into_pattern(self, name: impl Into<String>) -> Result<Pattern, MatchError> {
        let slots = match self {
            PatternDef::Slots(slots) => slots,
            PatternDef::Compact {
                positions,
                tolerance,
            } => positions
                .iter()
                .enumerate()
                .map(|(index, row)| match row.as_slice() {
                    [class_id, x, y, w, h] => Ok(Slot::point(
                        class_id_from(index, *class_id)?,
                        [*x, *y, *w, *h],
                        tolerance,
                    )),
                    _ => Err(MatchError::MalformedPosition {
                        index,
                        len: row.len(),
                    }),
                })
                .collect::<Result<Vec<_>, _>>()?,
        };

        Ok(Pattern::new(name, slots))
    }
}

fn class_id_from(index: usize, value: f64) -> Result<u32, MatchError> {
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= u32::MAX as f64 {
        Ok(value as u32)
    } else {
        Err(MatchError::MalformedClassId { index, value })
    }
}

impl Serialize for PatternLibrary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for pattern in self {
            map.serialize_entry(&pattern.name, &pattern.slots)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for PatternLibrary {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct LibraryVisitor;

        impl<'de> Visitor<'de> for LibraryVisitor {
            type Value = PatternLibrary;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map from pattern name to pattern definition")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut library = PatternLibrary::new();
                while let Some((name, def)) = map.next_entry::<String, PatternDef>()? {
                    let pattern = def.into_pattern(name).map_err(de::Error::custom)?;
                    library.insert(pattern).map_err(de::Error::custom)?;
                }
                Ok(library)
            }
        }

        deserializer.deserialize_map(LibraryVisitor)
    }
}
