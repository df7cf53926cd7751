//! Building the path → location index from a JSON text.
//!
//! The build runs in two passes: a pre-order walk of the spanned parse tree
//! creates one record per value (and one per object key) with empty parent
//! chains, and a second pass — strictly after every record exists — resolves
//! each path's strict-prefix ancestors into index chains. Parents are never
//! back-patched into partially built records.

use chumsky::prelude::*;
use indexmap::IndexMap;
use serde::Serialize;
use std::sync::Arc;

use crate::error::TrackedJsonError;
use crate::line_index::{line_length, LineIndex};
use crate::location::{Kind, LocationInfo};
use crate::parser::{parser, Json, Spanned};
use crate::path::{self, ERROR_PATH, ROOT_PATH};

/// Insertion-ordered map from canonical dot path to [`LocationInfo`].
///
/// Entry order is the pre-order traversal of the document, so a parent
/// always precedes its descendants; `parent_indexes` in the export format
/// are indices into this order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct LocationMap {
    entries: IndexMap<String, LocationInfo>,
}

impl LocationMap {
    /// Parse `text` and build the full location index.
    ///
    /// On malformed input this returns the typed error carrying the
    /// synthesized failure location; see [`LocationMap::build_lenient`] for
    /// the map-shaped alternative.
    pub fn build(text: &str) -> Result<LocationMap, TrackedJsonError> {
        let (output, errors) = parser().parse(text).into_output_errors();
        match output {
            Some(root) if errors.is_empty() => Ok(LocationMap::from_tree(text, &root)),
            _ => Err(synthesize_error(text, &errors)),
        }
    }

    /// Like [`LocationMap::build`], but a malformed input yields a map with
    /// the single synthesized entry at `$.__error__` instead of an error.
    pub fn build_lenient(text: &str) -> LocationMap {
        match LocationMap::build(text) {
            Ok(map) => map,
            Err(err) => LocationMap::error_map(err.location().clone()),
        }
    }

    pub(crate) fn error_map(location: LocationInfo) -> LocationMap {
        let mut entries = IndexMap::new();
        entries.insert(ERROR_PATH.to_string(), location);
        LocationMap { entries }
    }

    fn from_tree(text: &str, root: &Spanned<Json>) -> LocationMap {
        let index = LineIndex::new(text);
        let mut entries = IndexMap::new();
        collect(&index, root, ROOT_PATH.to_string(), &mut entries);
        link_parents(&mut entries);
        LocationMap { entries }
    }

    pub fn get(&self, path: &str) -> Option<&LocationInfo> {
        self.entries.get(path)
    }

    pub fn get_index(&self, index: usize) -> Option<(&String, &LocationInfo)> {
        self.entries.get_index(index)
    }

    pub fn index_of(&self, path: &str) -> Option<usize> {
        self.entries.get_index_of(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &LocationInfo)> {
        self.entries.iter()
    }

    pub fn paths(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    /// The ancestor locations of `location`, root first.
    pub fn parent_chain<'m>(
        &'m self,
        location: &'m LocationInfo,
    ) -> impl Iterator<Item = &'m LocationInfo> + 'm {
        location
            .parents
            .iter()
            .filter_map(|&i| self.entries.get_index(i).map(|(_, loc)| loc))
    }

    /// Whether this map is the single-entry result of a failed parse.
    pub fn is_error_map(&self) -> bool {
        self.entries.len() == 1 && self.entries.contains_key(ERROR_PATH)
    }

    /// Test-only hook for corrupting records to exercise the verifier.
    #[cfg(test)]
    pub(crate) fn replace_for_tests(&mut self, path: &str, location: LocationInfo) {
        self.entries.insert(path.to_string(), location);
    }
}

/// First pass: record every value location (and object key location) with an
/// empty parent chain.
fn collect(
    index: &LineIndex,
    node: &Spanned<Json>,
    node_path: String,
    out: &mut IndexMap<String, LocationInfo>,
) {
    let kind = Kind::from(&node.val);
    out.insert(
        node_path.clone(),
        record(index, node.span, path::last_segment(&node_path), kind),
    );

    match &node.val {
        Json::Object(members) => {
            for (key, val) in members {
                let child_path = path::join(&node_path, &key.val);
                out.insert(
                    path::key_path(&child_path),
                    record(index, key.span, &key.val, Kind::Key),
                );
                collect(index, val, child_path, out);
            }
        }
        Json::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                collect(index, item, path::join(&node_path, &i.to_string()), out);
            }
        }
        _ => {}
    }
}

fn record(index: &LineIndex, span: SimpleSpan<usize>, key: &str, kind: Kind) -> LocationInfo {
    let (start_line, start_col) = index.position_at(span.start);
    let (end_line, end_col) = index.position_at(span.end);
    LocationInfo {
        parents: Vec::new(),
        key: key.to_string(),
        kind,
        start_character_number: span.start + 1,
        start_line_number: start_line,
        start_line_character_number: start_col,
        end_character_number: span.end,
        end_line_number: end_line,
        end_line_character_number: end_col,
    }
}

/// Second pass: resolve every path's strict-prefix ancestors into index
/// chains, root first. Key-companion paths never appear as ancestors, so
/// only value locations become structural parents.
fn link_parents(entries: &mut IndexMap<String, LocationInfo>) {
    let paths: Vec<String> = entries.keys().cloned().collect();
    for p in paths {
        if p == ROOT_PATH {
            continue;
        }
        let chain: Vec<usize> = path::ancestors_of(&p)
            .iter()
            .filter_map(|ancestor| entries.get_index_of(ancestor.as_str()))
            .collect();
        if let Some(loc) = entries.get_mut(&p) {
            loc.parents = chain;
        }
    }
}

/// Synthesize the single best-effort failure location for a malformed input.
fn synthesize_error(text: &str, errors: &[Rich<'_, char>]) -> TrackedJsonError {
    let index = LineIndex::new(text);
    let (offset, message) = match errors.first() {
        Some(e) => (e.span().start.min(text.len()), e.to_string()),
        None => (0, "failed to parse JSON".to_string()),
    };
    let (line, col) = index.position_at(offset);
    let end_col = (col + 1).min(line_length(text, line).max(1));

    let location = LocationInfo {
        parents: Vec::new(),
        key: "__error__".to_string(),
        // placeholder kind; this record does not describe a real JSON value
        kind: Kind::String,
        start_character_number: offset + 1,
        start_line_number: line,
        start_line_character_number: col,
        end_character_number: (offset + 2).min(text.len()).max(1),
        end_line_number: line,
        end_line_character_number: end_col,
    };
    TrackedJsonError::new(message, location, Arc::from(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    const USER_JSON: &str =
        r#"{"user":{"name":"Ada Lovelace","age":36,"languages":["English","French"]}}"#;

    #[test]
    fn every_value_and_key_gets_a_location() {
        let map = LocationMap::build(USER_JSON).unwrap();

        for p in [
            "$",
            "$.user",
            "$.user.__key__",
            "$.user.name",
            "$.user.name.__key__",
            "$.user.age",
            "$.user.languages",
            "$.user.languages.0",
            "$.user.languages.1",
        ] {
            assert!(map.contains(p), "missing {p}");
        }

        assert_eq!(map.get("$").unwrap().kind, Kind::Object);
        assert_eq!(map.get("$.user.name").unwrap().kind, Kind::String);
        assert_eq!(map.get("$.user.name.__key__").unwrap().kind, Kind::Key);
        assert_eq!(map.get("$.user.age").unwrap().kind, Kind::Number);
        assert_eq!(map.get("$.user.languages").unwrap().kind, Kind::List);
    }

    #[test]
    fn slices_select_the_source_tokens() {
        let map = LocationMap::build(USER_JSON).unwrap();
        let slice = |p: &str| map.get(p).unwrap().slice(USER_JSON).unwrap();

        assert_eq!(slice("$"), USER_JSON);
        assert_eq!(slice("$.user.name"), "\"Ada Lovelace\"");
        assert_eq!(slice("$.user.name.__key__"), "\"name\"");
        assert_eq!(slice("$.user.age"), "36");
        assert_eq!(slice("$.user.languages.1"), "\"French\"");
    }

    #[test]
    fn parent_chains_are_root_first() {
        let map = LocationMap::build(USER_JSON).unwrap();

        let name = map.get("$.user.name").unwrap();
        let keys: Vec<&str> = map.parent_chain(name).map(|l| l.key.as_str()).collect();
        assert_eq!(keys, ["$", "user"]);
        assert_eq!(name.level(), 2);

        let root = map.get("$").unwrap();
        assert_eq!(root.level(), 0);

        // key tokens hang off the same ancestors as their value, value last
        let name_key = map.get("$.user.name.__key__").unwrap();
        let keys: Vec<&str> = map.parent_chain(name_key).map(|l| l.key.as_str()).collect();
        assert_eq!(keys, ["$", "user", "name"]);
    }

    #[test]
    fn deep_array_nesting() {
        let text = r#"{"items":[{"tags":["a","b"]}]}"#;
        let map = LocationMap::build(text).unwrap();

        let b = map.get("$.items.0.tags.1").unwrap();
        assert_eq!(b.slice(text).unwrap(), "\"b\"");
        assert_eq!(b.kind, Kind::String);
        let keys: Vec<&str> = map.parent_chain(b).map(|l| l.key.as_str()).collect();
        assert_eq!(keys, ["$", "items", "0", "tags"]);
        assert_eq!(b.level(), 4);
    }

    #[test]
    fn empty_containers_and_scalar_roots() {
        let map = LocationMap::build("{}").unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("$").unwrap().kind, Kind::Object);

        let map = LocationMap::build("[]").unwrap();
        assert_eq!(map.get("$").unwrap().kind, Kind::List);

        let map = LocationMap::build("\"hello\"").unwrap();
        let root = map.get("$").unwrap();
        assert_eq!(root.kind, Kind::String);
        assert_eq!(root.slice("\"hello\"").unwrap(), "\"hello\"");
    }

    #[test]
    fn malformed_input_synthesizes_one_error_entry() {
        let text = r#"{"invalid": json}"#;
        let err = LocationMap::build(text).unwrap_err();
        assert_eq!(err.location().key, "__error__");
        assert!(err.location().start_character_number >= 1);
        assert!(err.location().start_character_number <= text.len() + 1);
        assert_eq!(err.location().start_line_number, 1);

        let map = LocationMap::build_lenient(text);
        assert!(map.is_error_map());
        assert_eq!(map.len(), 1);
        let loc = map.get(ERROR_PATH).unwrap();
        assert!(loc.end_character_number >= loc.start_character_number);
        assert!(loc.start_line_number >= 1);
        assert!(loc.start_line_character_number >= 1);
    }

    #[test]
    fn arbitrary_garbage_never_panics() {
        for text in ["", "   ", "{", "[1, 2", "\u{1F680}\u{1F680}", "nul", "\"unterminated"] {
            let map = LocationMap::build_lenient(text);
            assert!(map.is_error_map(), "expected error map for {text:?}");
        }
    }

    #[test]
    fn repeated_parses_are_structurally_equal() {
        let a = LocationMap::build(USER_JSON).unwrap();
        let b = LocationMap::build(USER_JSON).unwrap();
        assert_eq!(a, b);
    }
}
