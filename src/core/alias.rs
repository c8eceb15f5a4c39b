//! Alias paths: the logical address of a node in a package-alias tree.

use std::fmt;

/// Dot-joined sequence of tree segments, e.g. `ui.forms.input`.
///
/// The root of a tree has the empty alias path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AliasPath(String);

impl AliasPath {
    /// The empty path at the root of a tree.
    pub fn root() -> Self {
        AliasPath(String::new())
    }

    /// Path of a child node reached through `segment`.
    pub fn child(&self, segment: &str) -> Self {
        if self.0.is_empty() {
            AliasPath(segment.to_string())
        } else {
            AliasPath(format!("{}.{}", self.0, segment))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AliasPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AliasPath {
    fn from(s: &str) -> Self {
        AliasPath(s.to_string())
    }
}
