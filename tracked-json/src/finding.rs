//! Contract types for validation rules consuming tracked documents.
//!
//! A rule inspects a [`TrackedJson`] document and returns findings; the
//! document guarantees that [`TrackedJson::get_location`] returns `None`
//! (never an error) for any path a rule cannot resolve, so location data is
//! always attached through an `Option`. The PCB rule implementations
//! themselves live with their consumers, not in this crate.

use serde::Serialize;

use crate::document::TrackedJson;
use crate::error::TrackedJsonError;
use crate::location::LocationInfo;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// One issue reported by a validation rule.
#[derive(Debug, Clone, Serialize)]
pub struct Finding {
    /// Stable identifier of the rule violation, e.g. `invalid_json`.
    pub error_type: String,
    pub message: String,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub net_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<LocationInfo>,
}

/// A validation rule over a tracked document.
pub trait Rule {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn check(&self, document: &TrackedJson) -> Vec<Finding>;
}

/// The standard finding for a document that failed to parse at all.
pub fn syntax_error_finding(error: &TrackedJsonError) -> Finding {
    let loc = error.location();
    Finding {
        error_type: "invalid_json".to_string(),
        message: format!(
            "{} at line {}, column {}",
            error.message(),
            loc.start_line_number,
            loc.start_line_character_number
        ),
        severity: Severity::Error,
        component_id: None,
        net_id: None,
        location: Some(loc.clone()),
    }
}
