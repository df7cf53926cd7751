//! Location-tracked JSON parsing for netlist validation.
//!
//! This library parses a JSON text into a value tree while recording, for
//! every value and every object key, the exact region of the source text it
//! came from. The result is an index from canonical dot paths (`$`,
//! `$.user.name`, `$.items.0`) to [`LocationInfo`] records carrying absolute
//! byte offsets and line/column positions, wired together with parent chains.
//!
//! We deviate from typical (de-)serialization libraries in that our primary
//! goal is not to be *fast*, but to let downstream validation rules point at
//! the precise bytes of an uploaded netlist document that triggered a
//! diagnostic. To this end we treat JSON more like a "programming language":
//! spans everywhere, recoverable syntax errors with a located failure site,
//! and a self-verification pass that cross-checks the offset arithmetic.
//!
//! The main entry points are [`TrackedJson`] (the navigable document view)
//! and [`LocationMap::build`] (the raw path → location index).

pub mod document;
pub mod error;
pub mod finding;
pub mod line_index;
pub mod location;
pub mod mapping;
pub mod parser;
pub mod path;
pub mod verify;

pub use document::TrackedJson;
pub use error::{DocumentError, TrackedJsonError};
pub use finding::{syntax_error_finding, Finding, Rule, Severity};
pub use line_index::{line_length, LineIndex};
pub use location::{Kind, LocationInfo};
pub use mapping::LocationMap;
pub use verify::verify_locations;
