//! The location record and the closed JSON kind classification.

use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::parser::Json;

/// The closed classification of a tracked element.
///
/// `Key` marks a location that spans an object's *key token*, not its value;
/// the other variants classify value tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Key,
    Object,
    List,
    Null,
    String,
    Boolean,
    Number,
}

impl Kind {
    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Key => "key",
            Kind::Object => "object",
            Kind::List => "list",
            Kind::Null => "null",
            Kind::String => "string",
            Kind::Boolean => "boolean",
            Kind::Number => "number",
        }
    }

    /// Whether locations of this kind may contain descendant locations.
    pub fn is_container(self) -> bool {
        matches!(self, Kind::Object | Kind::List)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&Json> for Kind {
    fn from(val: &Json) -> Self {
        match val {
            Json::Object(_) => Kind::Object,
            Json::Array(_) => Kind::List,
            Json::Null => Kind::Null,
            Json::Str(_) => Kind::String,
            Json::Bool(_) => Kind::Boolean,
            Json::Num(_) => Kind::Number,
        }
    }
}

impl From<&serde_json::Value> for Kind {
    fn from(val: &serde_json::Value) -> Self {
        match val {
            serde_json::Value::Object(_) => Kind::Object,
            serde_json::Value::Array(_) => Kind::List,
            serde_json::Value::Null => Kind::Null,
            serde_json::Value::String(_) => Kind::String,
            serde_json::Value::Bool(_) => Kind::Boolean,
            serde_json::Value::Number(_) => Kind::Number,
        }
    }
}

/// Position and structural metadata for one element of a JSON source text.
///
/// All `*_character_number` fields are 1-based byte positions; line and
/// in-line column numbers are 1-based too, with columns counted in bytes.
/// The element's source text is `text[start_character_number - 1 ..
/// end_character_number]`, and the line/column fields independently select
/// the same range through a [`crate::LineIndex`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationInfo {
    /// Indices of the ancestor locations within the owning
    /// [`crate::LocationMap`]'s entry list, root first, excluding self.
    pub parents: Vec<usize>,
    /// The name of this element as seen from its parent: an object key, an
    /// array index in decimal form, or `$` for the root.
    pub key: String,
    pub kind: Kind,
    pub start_character_number: usize,
    pub start_line_number: usize,
    pub start_line_character_number: usize,
    pub end_character_number: usize,
    pub end_line_number: usize,
    pub end_line_character_number: usize,
}

impl LocationInfo {
    /// Nesting depth: the number of ancestors, root included.
    pub fn level(&self) -> usize {
        self.parents.len()
    }

    /// The 0-based byte range of this element in the source text.
    pub fn byte_range(&self) -> Range<usize> {
        self.start_character_number - 1..self.end_character_number
    }

    /// The exact source text of this element, or `None` if the record does
    /// not describe a sliceable range of `text` (synthesized error records
    /// at the very end of the input, or a record from some other text).
    pub fn slice<'t>(&self, text: &'t str) -> Option<&'t str> {
        text.get(self.byte_range())
    }
}
