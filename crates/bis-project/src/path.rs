//! Normalized node paths.

use std::fmt;

/// Path of a node inside a project store.
///
/// Paths are relative to the store root and slash-separated; the empty
/// path names the root group itself. `NodePath` values are only produced
/// by store operations, which keeps them normalized by construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodePath(String);

impl NodePath {
    /// The root group.
    pub fn root() -> Self {
        Self(String::new())
    }

    /// The path of a direct child of this node.
    pub fn child(&self, name: &str) -> NodePath {
        if self.0.is_empty() {
            Self(name.to_string())
        } else {
            Self(format!("{}/{name}", self.0))
        }
    }

    /// Whether this path names the root group.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// The path as a slash-separated string ("" for the root).
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("/")
        } else {
            f.write_str(&self.0)
        }
    }
}
