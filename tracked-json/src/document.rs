//! The navigable, path-addressable document view.

use indexmap::IndexMap;
use serde::Serialize;
use std::sync::Arc;

use crate::error::{DocumentError, TrackedJsonError};
use crate::line_index::LineIndex;
use crate::location::{Kind, LocationInfo};
use crate::mapping::LocationMap;
use crate::path::{self, ROOT_PATH};

/// A read-only view over (source text + location index + lazily re-parsed
/// values), addressable by canonical dot paths, JSON Pointers, or relative
/// child names.
///
/// A view is logically immutable: navigation returns a new view sharing the
/// same text and index, with only the current path/location differing. All
/// shared state is behind `Arc`s, so cloning a view (or navigating) is cheap
/// and views can be used freely across threads.
#[derive(Debug, Clone)]
pub struct TrackedJson {
    text: Arc<str>,
    locations: Arc<LocationMap>,
    error: Option<Arc<TrackedJsonError>>,
    path: String,
    location: LocationInfo,
}

impl TrackedJson {
    /// Parse `text` into a tracked document, failing on malformed input.
    pub fn parse(text: &str) -> Result<TrackedJson, TrackedJsonError> {
        let map = LocationMap::build(text)?;
        Ok(TrackedJson::from_parts(Arc::from(text), Arc::new(map), None))
    }

    /// Parse `text` leniently: malformed input yields a document whose index
    /// holds only the synthesized `$.__error__` entry, with the typed error
    /// retained and queryable via [`TrackedJson::error`].
    pub fn loads(text: &str) -> TrackedJson {
        match LocationMap::build(text) {
            Ok(map) => TrackedJson::from_parts(Arc::from(text), Arc::new(map), None),
            Err(err) => {
                let map = LocationMap::error_map(err.location().clone());
                TrackedJson::from_parts(Arc::from(text), Arc::new(map), Some(Arc::new(err)))
            }
        }
    }

    fn from_parts(
        text: Arc<str>,
        locations: Arc<LocationMap>,
        error: Option<Arc<TrackedJsonError>>,
    ) -> TrackedJson {
        let location = locations
            .get(ROOT_PATH)
            .cloned()
            .unwrap_or_else(|| full_location(&text));
        TrackedJson {
            text,
            locations,
            error,
            path: ROOT_PATH.to_string(),
            location,
        }
    }

    fn view_at(&self, view_path: String, location: LocationInfo) -> TrackedJson {
        TrackedJson {
            text: Arc::clone(&self.text),
            locations: Arc::clone(&self.locations),
            error: self.error.clone(),
            path: view_path,
            location,
        }
    }

    /// The syntax error of a leniently parsed malformed document.
    pub fn error(&self) -> Option<&TrackedJsonError> {
        self.error.as_deref()
    }

    /// The full original source text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The canonical dot path of the current context.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn location(&self) -> &LocationInfo {
        &self.location
    }

    pub fn level(&self) -> usize {
        self.location.level()
    }

    /// The underlying path → location index.
    pub fn locations(&self) -> &LocationMap {
        &self.locations
    }

    /// Resolve any path form to its location, if it exists.
    ///
    /// This never fails: rule authors get `None` for anything they cannot
    /// resolve and must handle that before attaching location data.
    pub fn get_location(&self, target: &str) -> Option<&LocationInfo> {
        self.locations.get(&path::normalize(&self.path, target))
    }

    /// Strict accessor. Keys starting with `$` or `/` resolve absolutely
    /// from the root; anything else resolves as an immediate structural
    /// child of the current context.
    pub fn at(&self, key: &str) -> Result<TrackedJson, DocumentError> {
        if key.starts_with('$') || key.starts_with('/') {
            let abs = path::normalize(&self.path, key);
            let loc = self
                .locations
                .get(&abs)
                .ok_or_else(|| DocumentError::PathNotFound(abs.clone()))?;
            return Ok(self.view_at(abs, loc.clone()));
        }

        let child_path = path::join(&self.path, key);
        let me = self.locations.index_of(&self.path);
        match (self.locations.get(&child_path), me) {
            (Some(loc), Some(me)) if loc.kind != Kind::Key && loc.parents.last() == Some(&me) => {
                Ok(self.view_at(child_path, loc.clone()))
            }
            _ => Err(DocumentError::PathNotFound(child_path)),
        }
    }

    /// Non-strict accessor: like [`TrackedJson::at`] but absence is data.
    pub fn get(&self, key: &str) -> Option<TrackedJson> {
        self.at(key).ok()
    }

    /// Dual-resolution membership test; never fails.
    pub fn contains(&self, key: &str) -> bool {
        if key.starts_with('$') || key.starts_with('/') {
            return self.locations.contains(&path::normalize(&self.path, key));
        }
        self.at(key).is_ok()
    }

    fn children(&self) -> impl Iterator<Item = (&String, &LocationInfo)> + '_ {
        let me = self.locations.index_of(&self.path);
        self.locations.iter().filter(move |(_, loc)| {
            loc.kind != Kind::Key && me.is_some() && loc.parents.last() == me.as_ref()
        })
    }

    /// Number of immediate structural children of the current context.
    pub fn len(&self) -> usize {
        self.children().count()
    }

    pub fn is_empty(&self) -> bool {
        self.children().next().is_none()
    }

    /// Immediate child names, in index order. Key-token records are not
    /// children.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.children().map(|(_, loc)| loc.key.as_str())
    }

    /// Alias for [`TrackedJson::keys`], matching mapping-style iteration.
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.keys()
    }

    /// Immediate (name, sub-view) pairs.
    pub fn items(&self) -> Vec<(String, TrackedJson)> {
        self.children()
            .map(|(child_path, loc)| (loc.key.clone(), self.view_at(child_path.clone(), loc.clone())))
            .collect()
    }

    /// Immediate child sub-views.
    pub fn values(&self) -> Vec<TrackedJson> {
        self.items().into_iter().map(|(_, view)| view).collect()
    }

    /// The exact substring of the source text covered by the current span.
    pub fn raw_text(&self) -> &str {
        self.location.slice(&self.text).unwrap_or("")
    }

    /// Re-parse the current span as standalone JSON.
    pub fn value(&self) -> Result<serde_json::Value, TrackedJsonError> {
        if let Some(err) = &self.error {
            return Err((**err).clone());
        }
        serde_json::from_str(self.raw_text()).map_err(|e| {
            // unreachable when the index is consistent; surfaced as a typed
            // error rather than a panic regardless
            TrackedJsonError::new(
                format!("value at `{}` is not standalone JSON: {e}", self.path),
                self.location.clone(),
                Arc::clone(&self.text),
            )
        })
    }

    /// Serialize the entire location index, original text, and re-parsed
    /// value into the export document. Parent relationships are encoded as
    /// indices into the flattened location list, avoiding repeated
    /// serialization of shared ancestors.
    pub fn to_export_json(&self) -> Result<String, TrackedJsonError> {
        if let Some(err) = &self.error {
            return Err((**err).clone());
        }
        let original_data: serde_json::Value = serde_json::from_str(&self.text).map_err(|e| {
            TrackedJsonError::new(
                format!("original text is not standalone JSON: {e}"),
                self.location.clone(),
                Arc::clone(&self.text),
            )
        })?;

        let locations: IndexMap<&str, ExportLocation<'_>> = self
            .locations
            .iter()
            .map(|(loc_path, loc)| (loc_path.as_str(), ExportLocation::new(loc)))
            .collect();

        let export = Export {
            original_data,
            original_text: &self.text,
            locations,
            error: None,
        };
        serde_json::to_string_pretty(&export).map_err(|e| {
            TrackedJsonError::new(
                format!("failed to serialize location export: {e}"),
                self.location.clone(),
                Arc::clone(&self.text),
            )
        })
    }
}

#[derive(Serialize)]
struct Export<'a> {
    original_data: serde_json::Value,
    original_text: &'a str,
    locations: IndexMap<&'a str, ExportLocation<'a>>,
    error: Option<()>,
}

#[derive(Serialize)]
struct ExportLocation<'a> {
    key: &'a str,
    kind: Kind,
    level: usize,
    start_character_number: usize,
    start_line_number: usize,
    start_line_character_number: usize,
    end_character_number: usize,
    end_line_number: usize,
    end_line_character_number: usize,
    parent_indexes: &'a [usize],
}

impl<'a> ExportLocation<'a> {
    fn new(loc: &'a LocationInfo) -> Self {
        ExportLocation {
            key: &loc.key,
            kind: loc.kind,
            level: loc.level(),
            start_character_number: loc.start_character_number,
            start_line_number: loc.start_line_number,
            start_line_character_number: loc.start_line_character_number,
            end_character_number: loc.end_character_number,
            end_line_number: loc.end_line_number,
            end_line_character_number: loc.end_line_character_number,
            parent_indexes: &loc.parents,
        }
    }
}

/// Fallback location spanning the whole text, used as the root of documents
/// whose index has no `$` entry (i.e. failed parses).
fn full_location(text: &str) -> LocationInfo {
    let index = LineIndex::new(text);
    let (end_line, end_col) = index.position_at(text.len());
    LocationInfo {
        parents: Vec::new(),
        key: ROOT_PATH.to_string(),
        kind: Kind::Object,
        start_character_number: 1,
        start_line_number: 1,
        start_line_character_number: 1,
        end_character_number: text.len(),
        end_line_number: end_line,
        end_line_character_number: end_col,
    }
}
