//! Principal path helpers.
//!
//! Principal URIs are slash-separated paths with no trailing slash
//! (`principals/users/alice`). Listing, search, and identity resolution all
//! scope their results by the parent collection of a URI, and that parent is
//! always computed from the full path at call time rather than read from a
//! stored column. The split lives here, independent of any storage backend.

/// Splits a principal path into its parent collection and final segment.
///
/// Trailing slashes are ignored. A path without a separator has no parent.
///
/// ```
/// use dp_common::path::split;
///
/// assert_eq!(split("principals/users/alice"), (Some("principals/users"), "alice"));
/// assert_eq!(split("principals"), (None, "principals"));
/// ```
pub fn split(path: &str) -> (Option<&str>, &str) {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rsplit_once('/') {
        Some((parent, leaf)) => (Some(parent), leaf),
        None => (None, trimmed),
    }
}

/// Returns the parent collection of a path (the path with its final segment
/// stripped), or `None` for a top-level name.
pub fn parent(path: &str) -> Option<&str> {
    split(path).0
}

/// True when `path` sits directly under `prefix`: its parent collection
/// equals `prefix` exactly. Deeper descendants do not qualify.
pub fn is_direct_child(path: &str, prefix: &str) -> bool {
    parent(path) == Some(prefix)
}
