//! Canonical path keys and slash-path helpers.
//!
//! Every lookup in the content tree goes through a [`PathKey`]:
//!
//! - Always lower-case
//! - Always `/`-separated, starting with `/`
//! - No trailing slash (except the root key `/`)

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// Canonical lower-cased slash path (e.g. `/sect3/b1`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PathKey(Arc<str>);

impl PathKey {
    /// The root key, owned by the home node.
    pub fn root() -> Self {
        Self(Arc::from("/"))
    }

    /// Normalize any slash or backslash path into a key.
    ///
    /// `.` and `..` segments are collapsed the same way [`clean`] does.
    pub fn new(path: &str) -> Self {
        let lower = path.replace('\\', "/").to_lowercase();
        Self(Arc::from(clean(&lower)))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        &*self.0 == "/"
    }

    /// Number of path segments (`/` has 0, `/a/b` has 2).
    pub fn depth(&self) -> usize {
        segment_count(&self.0)
    }

    /// Key of the parent directory, `None` for the root.
    pub fn parent(&self) -> Option<PathKey> {
        if self.is_root() {
            return None;
        }
        let (dir, _) = split(&self.0);
        Some(Self(Arc::from(clean(dir))))
    }

    /// Last segment (empty for the root).
    pub fn name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or_default()
    }

    /// Append a relative path and re-canonicalize.
    pub fn join(&self, rel: &str) -> PathKey {
        Self::new(&format!("{}/{}", self.0, rel))
    }

    /// Check whether `self` equals `prefix` or lives beneath it.
    pub fn has_prefix(&self, prefix: &str) -> bool {
        has_path_prefix(&self.0, prefix)
    }
}

impl Default for PathKey {
    fn default() -> Self {
        Self::root()
    }
}

impl fmt::Display for PathKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for PathKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for PathKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for PathKey {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for PathKey {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

// ============================================================================
// Slash-path helpers
// ============================================================================

/// Lexically clean a slash path into rooted form.
///
/// Collapses empty and `.` segments, resolves `..` against the preceding
/// segment (`..` at the root is dropped).
///
/// - `clean("a/./b/../c/")` -> `"/a/c"`
/// - `clean("../x")` -> `"/x"`
/// - `clean("")` -> `"/"`
pub fn clean(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            _ => segments.push(part),
        }
    }

    if segments.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", segments.join("/"))
    }
}

/// Join slash path parts, then [`clean`] the result.
pub fn join(parts: &[&str]) -> String {
    clean(&parts.join("/"))
}

/// Split into `(dir, file)`; `dir` keeps its trailing slash.
///
/// - `split("images/pic.png")` -> `("images/", "pic.png")`
/// - `split("pic.png")` -> `("", "pic.png")`
pub fn split(path: &str) -> (&str, &str) {
    match path.rfind('/') {
        Some(i) => (&path[..=i], &path[i + 1..]),
        None => ("", path),
    }
}

/// Extension of the last segment including the dot (`""` if none).
pub fn ext(path: &str) -> &str {
    let (_, file) = split(path);
    match file.rfind('.') {
        Some(i) => &file[i..],
        None => "",
    }
}

/// Path with the extension of its last segment removed.
pub fn path_no_ext(path: &str) -> &str {
    &path[..path.len() - ext(path).len()]
}

/// Count non-empty segments.
pub fn segment_count(path: &str) -> usize {
    path.split('/').filter(|s| !s.is_empty()).count()
}

/// Segment-aware prefix test: `/a/b` is under `/a`, but `/ab` is not.
pub fn has_path_prefix(path: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        return true;
    }
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}
