//! Canonical dot-path addressing and RFC 6901 pointer conversion.
//!
//! Paths are `$`-rooted and dot-separated: `$`, `$.user.name`, `$.items.0`.
//! Array indices appear as decimal segments. The companion path
//! `<value-path>.__key__` addresses the *key token* of an object field.
//!
//! Known limitation: object keys containing a literal `.` are not escaped,
//! so such a key is indistinguishable from nesting (`$.a.b` may mean field
//! `b` of `a` or a single field named `a.b`). Consumers depend on the exact
//! path strings, so the scheme is kept as-is rather than extended.

/// The canonical path of the document root.
pub const ROOT_PATH: &str = "$";

/// Suffix addressing the key token of an object field.
pub const KEY_SUFFIX: &str = ".__key__";

/// The path of the synthesized location for a malformed document.
pub const ERROR_PATH: &str = "$.__error__";

/// Append a child segment to a path.
pub fn join(parent: &str, segment: &str) -> String {
    if parent == ROOT_PATH {
        format!("$.{segment}")
    } else {
        format!("{parent}.{segment}")
    }
}

/// The companion path of an object field's key token.
pub fn key_path(value_path: &str) -> String {
    format!("{value_path}{KEY_SUFFIX}")
}

pub fn is_key_path(path: &str) -> bool {
    path.ends_with(KEY_SUFFIX)
}

/// The final segment of a path (`$` for the root).
pub fn last_segment(path: &str) -> &str {
    if path == ROOT_PATH {
        return ROOT_PATH;
    }
    path.rsplit('.').next().unwrap_or(path)
}

/// Ordered strict-prefix ancestor paths, root first.
///
/// `$.a.b.2` yields `["$", "$.a", "$.a.b"]`; the root has no ancestors.
pub fn ancestors_of(path: &str) -> Vec<String> {
    if path == ROOT_PATH {
        return Vec::new();
    }
    let parts: Vec<&str> = path.split('.').collect();
    (1..parts.len()).map(|i| parts[..i].join(".")).collect()
}

/// Unescape one RFC 6901 pointer token: `~1` → `/`, then `~0` → `~`.
pub fn unescape_pointer_token(token: &str) -> String {
    token.replace("~1", "/").replace("~0", "~")
}

/// Escape one path segment into RFC 6901 pointer form: `~` → `~0`, `/` → `~1`.
pub fn escape_pointer_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

/// Convert an RFC 6901 JSON Pointer to a canonical dot path.
///
/// `""` and `"/"` both mean the root.
pub fn pointer_to_path(pointer: &str) -> String {
    if pointer.is_empty() || pointer == "/" {
        return ROOT_PATH.to_string();
    }
    let segments: Vec<String> = pointer
        .trim_start_matches('/')
        .split('/')
        .map(unescape_pointer_token)
        .collect();
    format!("$.{}", segments.join("."))
}

/// Convert a canonical dot path back to RFC 6901 pointer form.
pub fn path_to_pointer(path: &str) -> String {
    if path == ROOT_PATH {
        return String::new();
    }
    let mut out = String::new();
    for segment in path.split('.').skip(1) {
        out.push('/');
        out.push_str(&escape_pointer_token(segment));
    }
    out
}

/// Normalize a user-supplied address against the current context path.
///
/// `/…` is converted from pointer form, `$…` is taken as already canonical,
/// the empty string means "here", and anything else is a relative child of
/// `current`.
pub fn normalize(current: &str, input: &str) -> String {
    if input.is_empty() {
        return current.to_string();
    }
    if input.starts_with('/') {
        return pointer_to_path(input);
    }
    if input.starts_with('$') {
        return input.to_string();
    }
    join(current, input)
}
