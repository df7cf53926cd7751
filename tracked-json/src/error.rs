//! Typed errors for parsing and document navigation.

use std::fmt;
use std::sync::Arc;

use crate::location::LocationInfo;

/// A JSON syntax error annotated with a synthesized source location.
///
/// Carries the parser's message, a one-character [`LocationInfo`] at the
/// failure site, and the source text itself so that callers can render a
/// context window without holding the input separately.
#[derive(Debug, Clone)]
pub struct TrackedJsonError {
    message: String,
    location: LocationInfo,
    text: Arc<str>,
}

impl TrackedJsonError {
    pub(crate) fn new(message: impl Into<String>, location: LocationInfo, text: Arc<str>) -> Self {
        TrackedJsonError {
            message: message.into(),
            location,
            text,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn location(&self) -> &LocationInfo {
        &self.location
    }

    /// The 0-based byte offset of the failure site.
    pub fn offset(&self) -> usize {
        self.location.start_character_number - 1
    }

    /// A newline-escaped window of ±`radius` bytes around the failure site,
    /// widened to character boundaries.
    pub fn snippet(&self, radius: usize) -> String {
        let pos = self.offset().min(self.text.len());
        let mut start = pos.saturating_sub(radius);
        let mut end = (pos + radius).min(self.text.len());
        while !self.text.is_char_boundary(start) {
            start -= 1;
        }
        while !self.text.is_char_boundary(end) {
            end += 1;
        }
        self.text[start..end].replace('\n', "\\n")
    }
}

impl fmt::Display for TrackedJsonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at line {}, column {} (char {}). Context: …{}…",
            self.message,
            self.location.start_line_number,
            self.location.start_line_character_number,
            self.location.start_character_number,
            self.snippet(40)
        )
    }
}

impl std::error::Error for TrackedJsonError {}

/// Errors surfaced by the strict document accessors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DocumentError {
    #[error("unknown path `{0}`")]
    PathNotFound(String),
    #[error(transparent)]
    Syntax(#[from] TrackedJsonError),
}
