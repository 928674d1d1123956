//! Canonical repository paths
//!
//! Every path inside a repository is normalized once, at construction:
//! no leading or trailing separators and no empty segments. Hierarchy
//! questions (parent, child, "is this under that root") are answered by
//! comparing segments, never by raw substring slicing.

use std::fmt;

/// Path separator used by the remote repository
pub const SEPARATOR: char = '/';

/// Trailing segment that marks a special view rather than a real entry
pub const VIEW_MARKER: &str = "*view*";

/// Normalized slash-delimited path relative to the repository root.
///
/// The empty path is the repository root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RepoPath(String);

impl RepoPath {
    /// Create a path, normalizing separators
    pub fn new(path: &str) -> Self {
        let normalized = path
            .split(SEPARATOR)
            .filter(|segment| !segment.is_empty())
            .collect::<Vec<_>>()
            .join("/");
        Self(normalized)
    }

    /// The repository root
    pub fn root() -> Self {
        Self(String::new())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over path segments
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(SEPARATOR).filter(|s| !s.is_empty())
    }

    /// Last segment, or the empty string for the root
    pub fn name(&self) -> &str {
        match self.0.rfind(SEPARATOR) {
            Some(idx) => &self.0[idx + 1..],
            None => &self.0,
        }
    }

    /// Parent path. The root is its own parent.
    pub fn parent(&self) -> Self {
        match self.0.rfind(SEPARATOR) {
            Some(idx) => Self(self.0[..idx].to_string()),
            None => Self::root(),
        }
    }

    /// Append a relative name, which may itself contain separators
    pub fn child(&self, name: &str) -> Self {
        let name = Self::new(name);
        if self.is_root() {
            name
        } else if name.is_root() {
            self.clone()
        } else {
            Self(format!("{}/{}", self.0, name.0))
        }
    }

    /// Path of `self` relative to `root`, if `self` is `root` or lies under it.
    ///
    /// Returns `Some("")` when both are equal.
    pub fn relative_to(&self, root: &RepoPath) -> Option<&str> {
        if root.is_root() {
            return Some(&self.0);
        }
        let rest = self.0.strip_prefix(root.as_str())?;
        if rest.is_empty() {
            Some("")
        } else {
            rest.strip_prefix(SEPARATOR)
        }
    }

    /// Whether `self` equals `ancestor` or lies beneath it
    pub fn starts_with(&self, ancestor: &RepoPath) -> bool {
        self.relative_to(ancestor).is_some()
    }

    /// Whether this path addresses a special view rather than an entry
    pub fn is_view_marker(&self) -> bool {
        self.name() == VIEW_MARKER
    }
}

impl fmt::Display for RepoPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RepoPath {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<String> for RepoPath {
    fn from(path: String) -> Self {
        Self::new(&path)
    }
}

impl AsRef<str> for RepoPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// First segment of `relative` after `prefix`, when `relative` lies under it.
///
/// `prefix` is a relative directory path; `""` means the frame root.
pub(crate) fn immediate_child<'a>(relative: &'a str, prefix: &str) -> Option<&'a str> {
    let remainder = if prefix.is_empty() {
        relative
    } else {
        relative.strip_prefix(prefix)?.strip_prefix(SEPARATOR)?
    };
    let name = remainder.split(SEPARATOR).next().unwrap_or(remainder);
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}
