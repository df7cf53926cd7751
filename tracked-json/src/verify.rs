//! Consistency oracle for location maps.
//!
//! [`verify_locations`] cross-checks a built index against the source text:
//! offset slices must agree with line/column slices, key tokens must encode
//! their key, value slices must re-parse standalone as the recorded kind,
//! and container spans must contain their descendants. It performs no
//! mutation and reports violations as data; production callers may skip it,
//! the test suite runs it on every fixture.

use crate::line_index::LineIndex;
use crate::location::{Kind, LocationInfo};
use crate::mapping::LocationMap;
use crate::path;

pub fn verify_locations(text: &str, map: &LocationMap) -> Vec<String> {
    let mut problems = Vec::new();
    // synthesized error maps are not derived from a parse tree; nothing to check
    if map.is_error_map() {
        return problems;
    }

    let index = LineIndex::new(text);

    for (loc_path, loc) in map.iter() {
        // slice by absolute character numbers
        let Some(by_offset) = loc.slice(text) else {
            problems.push(format!(
                "{loc_path}: span {}..{} does not slice the text",
                loc.start_character_number, loc.end_character_number
            ));
            continue;
        };

        // slice by line/column through the line-start table; both must agree
        let start = index.offset_at(loc.start_line_number, loc.start_line_character_number);
        let end = index.offset_at(loc.end_line_number, loc.end_line_character_number);
        match text.get(start..end) {
            Some(by_line) if by_line == by_offset => {}
            Some(by_line) => problems.push(format!(
                "{loc_path}: absolute vs line/col slice mismatch: {by_offset:?} != {by_line:?}"
            )),
            None => problems.push(format!(
                "{loc_path}: line/col range {start}..{end} does not slice the text"
            )),
        }

        check_parent_chain(map, loc_path, loc, &mut problems);

        match loc.kind {
            Kind::Key => check_key(map, loc_path, loc, by_offset, &mut problems),
            kind => check_value(map, loc_path, loc, by_offset, kind, &mut problems),
        }
    }

    problems
}

fn check_parent_chain(
    map: &LocationMap,
    loc_path: &str,
    loc: &LocationInfo,
    problems: &mut Vec<String>,
) {
    for &parent_index in &loc.parents {
        match map.get_index(parent_index) {
            Some((parent_path, _)) => {
                if !loc_path.starts_with(&format!("{parent_path}.")) {
                    problems.push(format!(
                        "{loc_path}: parent {parent_path} is not a path prefix"
                    ));
                }
            }
            None => problems.push(format!(
                "{loc_path}: parent index {parent_index} out of range"
            )),
        }
    }
}

/// A key token's slice must be the JSON encoding of its `key` field, and it
/// must sit inside the object that declares it (the enclosing container is
/// the second-to-last parent; the last is the field's own value).
fn check_key(
    map: &LocationMap,
    loc_path: &str,
    loc: &LocationInfo,
    slice: &str,
    problems: &mut Vec<String>,
) {
    let expected = serde_json::Value::String(loc.key.clone()).to_string();
    if slice != expected && slice.trim() != expected {
        problems.push(format!(
            "{loc_path}: key content mismatch. got {slice:?}, expected {expected:?}"
        ));
    }

    if loc.parents.len() >= 2 {
        let object_index = loc.parents[loc.parents.len() - 2];
        if let Some((object_path, object)) = map.get_index(object_index) {
            if !span_contains(object, loc) {
                problems.push(format!(
                    "{loc_path}: key token not within enclosing object {object_path} \
                     ({}-{} vs {}-{})",
                    object.start_character_number,
                    object.end_character_number,
                    loc.start_character_number,
                    loc.end_character_number
                ));
            }
        }
    }
}

fn check_value(
    map: &LocationMap,
    loc_path: &str,
    loc: &LocationInfo,
    slice: &str,
    kind: Kind,
    problems: &mut Vec<String>,
) {
    // the slice must independently parse as standalone JSON of the same kind
    match serde_json::from_str::<serde_json::Value>(slice) {
        Ok(value) => {
            let reparsed = Kind::from(&value);
            if reparsed != kind {
                problems.push(format!(
                    "{loc_path}: slice parses as {reparsed} but is recorded as {kind}"
                ));
            }
        }
        Err(e) => {
            problems.push(format!(
                "{loc_path}: value is not standalone-parsable JSON: {e}"
            ));
            return;
        }
    }

    let child_paths = descendant_value_paths(map, loc_path);
    if kind.is_container() {
        for child_path in child_paths {
            if let Some(child) = map.get(&child_path) {
                if !span_contains(loc, child) {
                    problems.push(format!(
                        "{loc_path}: child {child_path} span not within parent span \
                         (parent {}-{}, child {}-{})",
                        loc.start_character_number,
                        loc.end_character_number,
                        child.start_character_number,
                        child.end_character_number
                    ));
                }
            }
        }
    } else if !child_paths.is_empty() {
        problems.push(format!(
            "{loc_path}: primitive value has children: {:?}",
            &child_paths[..child_paths.len().min(5)]
        ));
    }
}

fn descendant_value_paths(map: &LocationMap, loc_path: &str) -> Vec<String> {
    let prefix = if loc_path == path::ROOT_PATH {
        "$.".to_string()
    } else {
        format!("{loc_path}.")
    };
    map.paths()
        .filter(|p| p.starts_with(&prefix) && !path::is_key_path(p))
        .cloned()
        .collect()
}

fn span_contains(outer: &LocationInfo, inner: &LocationInfo) -> bool {
    outer.start_character_number <= inner.start_character_number
        && inner.start_character_number <= inner.end_character_number
        && inner.end_character_number <= outer.end_character_number
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURES: &[&str] = &[
        r#"{"user":{"name":"Ada Lovelace","age":36,"languages":["English","French"]}}"#,
        "{\n  \"level1\": {\n    \"level2\": {\"value\": \"deep\"}\n  },\n  \"array\": [\n    {\"id\": 1},\n    {\"id\": 2}\n  ]\n}",
        r#"{"items":[{"tags":["a","b"]}]}"#,
        "{}",
        "[]",
        "\"hello\"",
        "null",
        "true",
        "-12.5e-1",
        r#"{"name": "José", "emoji": "🚀", "quote": "He said \"Hello\""}"#,
        "{ \"spaced\" :\t[ 1 ,\n 2 ] }",
    ];

    #[test]
    fn all_fixtures_verify_clean() {
        for text in FIXTURES {
            let map = LocationMap::build(text).unwrap();
            let problems = verify_locations(text, &map);
            assert!(problems.is_empty(), "{text}: {problems:#?}");
        }
    }

    #[test]
    fn error_maps_are_exempt() {
        let map = LocationMap::build_lenient("{oops");
        assert!(verify_locations("{oops", &map).is_empty());
    }

    #[test]
    fn corrupted_offsets_are_reported() {
        let text = r#"{"a": 1}"#;
        let mut broken = LocationMap::build(text).unwrap();
        // shift a record off its token; the two slice checks must now disagree
        poke(&mut broken, "$.a", |loc| loc.start_character_number += 1);
        let problems = verify_locations(text, &broken);
        assert!(!problems.is_empty());
        assert!(problems.iter().any(|p| p.contains("$.a")));
    }

    #[test]
    fn kind_mismatches_are_reported() {
        let text = r#"{"a": 1}"#;
        let mut broken = LocationMap::build(text).unwrap();
        poke(&mut broken, "$.a", |loc| loc.kind = Kind::Boolean);
        let problems = verify_locations(text, &broken);
        assert!(problems.iter().any(|p| p.contains("recorded as boolean")));
    }

    fn poke(map: &mut LocationMap, path: &str, f: impl FnOnce(&mut LocationInfo)) {
        let mut loc = map.get(path).unwrap().clone();
        f(&mut loc);
        map.replace_for_tests(path, loc);
    }
}
