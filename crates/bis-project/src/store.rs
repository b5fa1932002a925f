//! The in-memory project tree and its node operations.
//!
//! The tree is kept as a flat, sorted map from slash-separated node paths
//! to nodes. Sorted keys make child listings deterministic, which the
//! applet serializers rely on for stable on-disk ordering.

use std::collections::BTreeMap;

use chrono::Utc;
use rkyv::{Archive, Deserialize, Serialize};

use crate::error::{Result, StoreError};
use crate::path::NodePath;
use crate::types::{ArrayDataset, Node, ScalarValue};
use crate::version::{CURRENT_PROJECT_VERSION, PROJECT_VERSION_KEY};

/// One project file's worth of hierarchical state.
///
/// Invariant: every non-root node's parent path is present as a group.
/// All mutating operations validate the parent before touching the map.
#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize)]
#[rkyv(compare(PartialEq))]
pub struct ProjectStore {
    /// When the project was created (RFC 3339).
    created_at: String,
    /// When the project was last saved (RFC 3339).
    last_saved_at: String,
    /// Node paths to nodes, lexicographically sorted.
    entries: BTreeMap<String, Node>,
}

impl Default for ProjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ProjectStore {
    /// Create an empty project stamped with the current format version.
    pub fn new() -> Self {
        Self::with_format_version(CURRENT_PROJECT_VERSION)
    }

    /// Create an empty project stamped with an explicit format version.
    ///
    /// Used by migration tooling that needs to materialize stores in
    /// older layouts.
    pub fn with_format_version(version: f64) -> Self {
        let now = Utc::now().to_rfc3339();
        let mut entries = BTreeMap::new();
        entries.insert(
            PROJECT_VERSION_KEY.to_string(),
            Node::Scalar(ScalarValue::Float(version)),
        );
        Self {
            created_at: now.clone(),
            last_saved_at: now,
            entries,
        }
    }

    /// The root group.
    pub fn root() -> NodePath {
        NodePath::root()
    }

    /// The project format version, read from the root scalar.
    pub fn format_version(&self) -> Result<f64> {
        self.read_float(&NodePath::root(), PROJECT_VERSION_KEY)
    }

    /// When the project was created (RFC 3339).
    pub fn created_at(&self) -> &str {
        &self.created_at
    }

    /// When the project was last saved (RFC 3339).
    pub fn last_saved_at(&self) -> &str {
        &self.last_saved_at
    }

    /// Update the last saved timestamp.
    pub(crate) fn touch(&mut self) {
        self.last_saved_at = Utc::now().to_rfc3339();
    }

    /// Return the existing child group, creating it if necessary.
    ///
    /// Idempotent; repeated calls return the same path. Fails only if the
    /// name is taken by a non-group node.
    pub fn get_or_create_group(&mut self, parent: &NodePath, name: &str) -> Result<NodePath> {
        validate_name(name)?;
        self.require_group(parent)?;
        let path = parent.child(name);
        match self.entries.get(path.as_str()) {
            Some(Node::Group) => Ok(path),
            Some(_) => Err(StoreError::NotAGroup {
                path: path.as_str().to_string(),
            }),
            None => {
                self.entries.insert(path.as_str().to_string(), Node::Group);
                Ok(path)
            }
        }
    }

    /// Create a new child group; fails if any node already has the name.
    pub fn create_child_group(&mut self, parent: &NodePath, name: &str) -> Result<NodePath> {
        validate_name(name)?;
        self.require_group(parent)?;
        let path = parent.child(name);
        if self.entries.contains_key(path.as_str()) {
            return Err(StoreError::AlreadyExists {
                path: path.as_str().to_string(),
            });
        }
        self.entries.insert(path.as_str().to_string(), Node::Group);
        Ok(path)
    }

    /// Look up an existing child group.
    pub fn group(&self, parent: &NodePath, name: &str) -> Option<NodePath> {
        let path = parent.child(name);
        match self.entries.get(path.as_str()) {
            Some(Node::Group) => Some(path),
            _ => None,
        }
    }

    /// Whether any node (of any kind) exists under the given name.
    pub fn contains(&self, parent: &NodePath, name: &str) -> bool {
        self.entries.contains_key(parent.child(name).as_str())
    }

    /// Write a float scalar, creating or overwriting.
    pub fn write_float(&mut self, parent: &NodePath, key: &str, value: f64) -> Result<()> {
        self.write_scalar(parent, key, ScalarValue::Float(value))
    }

    /// Write a text scalar, creating or overwriting.
    pub fn write_text(
        &mut self,
        parent: &NodePath,
        key: &str,
        value: impl Into<String>,
    ) -> Result<()> {
        self.write_scalar(parent, key, ScalarValue::Text(value.into()))
    }

    /// Read a float scalar.
    pub fn read_float(&self, parent: &NodePath, key: &str) -> Result<f64> {
        let path = parent.child(key);
        match self.scalar(&path)? {
            ScalarValue::Float(value) => Ok(*value),
            ScalarValue::Text(_) => Err(StoreError::ScalarTypeMismatch {
                path: path.as_str().to_string(),
                expected: "float",
            }),
        }
    }

    /// Read a text scalar.
    pub fn read_text(&self, parent: &NodePath, key: &str) -> Result<&str> {
        let path = parent.child(key);
        match self.scalar(&path)? {
            ScalarValue::Text(value) => Ok(value),
            ScalarValue::Float(_) => Err(StoreError::ScalarTypeMismatch {
                path: path.as_str().to_string(),
                expected: "text",
            }),
        }
    }

    /// Names of the direct children of a group, sorted.
    pub fn list_children(&self, group: &NodePath) -> Result<Vec<String>> {
        self.require_group(group)?;
        let prefix = child_prefix(group);
        Ok(self
            .entries
            .range(prefix.clone()..)
            .take_while(|(key, _)| key.starts_with(&prefix))
            .filter_map(|(key, _)| {
                let rest = &key[prefix.len()..];
                (!rest.is_empty() && !rest.contains('/')).then(|| rest.to_string())
            })
            .collect())
    }

    /// Delete a child node; for groups, the whole subtree goes with it.
    pub fn delete_child(&mut self, parent: &NodePath, name: &str) -> Result<()> {
        validate_name(name)?;
        self.require_group(parent)?;
        let path = parent.child(name);
        let node = self
            .entries
            .remove(path.as_str())
            .ok_or_else(|| StoreError::NotFound {
                path: path.as_str().to_string(),
            })?;
        if matches!(node, Node::Group) {
            let prefix = format!("{}/", path.as_str());
            let doomed: Vec<String> = self
                .entries
                .range(prefix.clone()..)
                .take_while(|(key, _)| key.starts_with(&prefix))
                .map(|(key, _)| key.clone())
                .collect();
            for key in doomed {
                self.entries.remove(&key);
            }
        }
        Ok(())
    }

    /// Create an array dataset; fails if any node already has the name.
    pub fn create_array(
        &mut self,
        parent: &NodePath,
        key: &str,
        dataset: ArrayDataset,
    ) -> Result<NodePath> {
        validate_name(key)?;
        self.require_group(parent)?;
        let path = parent.child(key);
        if self.entries.contains_key(path.as_str()) {
            return Err(StoreError::AlreadyExists {
                path: path.as_str().to_string(),
            });
        }
        self.entries
            .insert(path.as_str().to_string(), Node::Array(dataset));
        Ok(path)
    }

    /// Read an array dataset.
    pub fn array(&self, parent: &NodePath, key: &str) -> Result<&ArrayDataset> {
        let path = parent.child(key);
        match self.entries.get(path.as_str()) {
            Some(Node::Array(dataset)) => Ok(dataset),
            Some(_) => Err(StoreError::NotAnArray {
                path: path.as_str().to_string(),
            }),
            None => Err(StoreError::NotFound {
                path: path.as_str().to_string(),
            }),
        }
    }

    /// The node at a child name, if any. Mostly useful for inspection.
    pub fn node(&self, parent: &NodePath, name: &str) -> Option<&Node> {
        self.entries.get(parent.child(name).as_str())
    }

    fn scalar(&self, path: &NodePath) -> Result<&ScalarValue> {
        match self.entries.get(path.as_str()) {
            Some(Node::Scalar(value)) => Ok(value),
            Some(_) => Err(StoreError::NotAScalar {
                path: path.as_str().to_string(),
            }),
            None => Err(StoreError::NotFound {
                path: path.as_str().to_string(),
            }),
        }
    }

    fn write_scalar(&mut self, parent: &NodePath, key: &str, value: ScalarValue) -> Result<()> {
        validate_name(key)?;
        self.require_group(parent)?;
        let path = parent.child(key);
        match self.entries.get(path.as_str()) {
            None | Some(Node::Scalar(_)) => {
                self.entries
                    .insert(path.as_str().to_string(), Node::Scalar(value));
                Ok(())
            }
            Some(_) => Err(StoreError::NotAScalar {
                path: path.as_str().to_string(),
            }),
        }
    }

    fn require_group(&self, path: &NodePath) -> Result<()> {
        if path.is_root() {
            return Ok(());
        }
        match self.entries.get(path.as_str()) {
            Some(Node::Group) => Ok(()),
            Some(_) => Err(StoreError::NotAGroup {
                path: path.as_str().to_string(),
            }),
            None => Err(StoreError::NotFound {
                path: path.as_str().to_string(),
            }),
        }
    }
}

fn child_prefix(group: &NodePath) -> String {
    if group.is_root() {
        String::new()
    } else {
        format!("{}/", group.as_str())
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name.contains('/') {
        return Err(StoreError::InvalidName {
            name: name.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_store_has_format_version() {
        let store = ProjectStore::new();
        assert_eq!(store.format_version().unwrap(), CURRENT_PROJECT_VERSION);
    }

    #[test]
    fn test_get_or_create_group_is_idempotent() {
        let mut store = ProjectStore::new();
        let root = ProjectStore::root();
        let first = store.get_or_create_group(&root, "DataSelection").unwrap();
        let second = store.get_or_create_group(&root, "DataSelection").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_get_or_create_group_rejects_non_group_nodes() {
        let mut store = ProjectStore::new();
        let root = ProjectStore::root();
        store.write_text(&root, "note", "hello").unwrap();
        let result = store.get_or_create_group(&root, "note");
        assert!(matches!(result, Err(StoreError::NotAGroup { .. })));
    }

    #[test]
    fn test_scalar_round_trip_and_type_mismatch() {
        let mut store = ProjectStore::new();
        let root = ProjectStore::root();
        let group = store.get_or_create_group(&root, "meta").unwrap();

        store.write_float(&group, "version", 0.1).unwrap();
        store.write_text(&group, "name", "demo").unwrap();

        assert_eq!(store.read_float(&group, "version").unwrap(), 0.1);
        assert_eq!(store.read_text(&group, "name").unwrap(), "demo");

        assert!(matches!(
            store.read_text(&group, "version"),
            Err(StoreError::ScalarTypeMismatch { .. })
        ));
        assert!(matches!(
            store.read_float(&group, "missing"),
            Err(StoreError::NotFound { .. })
        ));
    }

    #[test]
    fn test_scalar_overwrite() {
        let mut store = ProjectStore::new();
        let root = ProjectStore::root();
        let group = store.get_or_create_group(&root, "meta").unwrap();
        store.write_float(&group, "v", 0.1).unwrap();
        store.write_float(&group, "v", 0.2).unwrap();
        assert_eq!(store.read_float(&group, "v").unwrap(), 0.2);
    }

    #[test]
    fn test_list_children_is_sorted() {
        let mut store = ProjectStore::new();
        let root = ProjectStore::root();
        let infos = store.get_or_create_group(&root, "infos").unwrap();
        for name in ["info002", "info000", "info001"] {
            store.create_child_group(&infos, name).unwrap();
        }
        assert_eq!(
            store.list_children(&infos).unwrap(),
            vec!["info000", "info001", "info002"]
        );
    }

    #[test]
    fn test_list_children_excludes_grandchildren() {
        let mut store = ProjectStore::new();
        let root = ProjectStore::root();
        let top = store.get_or_create_group(&root, "top").unwrap();
        let inner = store.get_or_create_group(&top, "inner").unwrap();
        store.write_text(&inner, "leaf", "x").unwrap();
        assert_eq!(store.list_children(&top).unwrap(), vec!["inner"]);
    }

    #[test]
    fn test_delete_child_removes_subtree() {
        let mut store = ProjectStore::new();
        let root = ProjectStore::root();
        let top = store.get_or_create_group(&root, "top").unwrap();
        let inner = store.get_or_create_group(&top, "inner").unwrap();
        store.write_text(&inner, "leaf", "x").unwrap();

        store.delete_child(&root, "top").unwrap();
        assert!(store.group(&root, "top").is_none());
        assert!(matches!(
            store.read_text(&inner, "leaf"),
            Err(StoreError::NotFound { .. })
        ));
    }

    #[test]
    fn test_delete_missing_child_is_an_error() {
        let mut store = ProjectStore::new();
        let result = store.delete_child(&ProjectStore::root(), "nope");
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    }

    #[test]
    fn test_array_create_read_and_attrs() {
        let mut store = ProjectStore::new();
        let root = ProjectStore::root();
        let data = store.get_or_create_group(&root, "local_data").unwrap();

        let dataset =
            ArrayDataset::new(vec![2, 3], vec![0, 1, 2, 3, 4, 5]).with_attr("axistags", "{}");
        store.create_array(&data, "abc", dataset).unwrap();

        let read = store.array(&data, "abc").unwrap();
        assert_eq!(read.shape, vec![2, 3]);
        assert_eq!(read.data, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(read.attr("axistags"), Some("{}"));

        let duplicate = store.create_array(&data, "abc", ArrayDataset::new(vec![], vec![]));
        assert!(matches!(duplicate, Err(StoreError::AlreadyExists { .. })));
    }

    #[test]
    fn test_invalid_names_are_rejected() {
        let mut store = ProjectStore::new();
        let root = ProjectStore::root();
        assert!(matches!(
            store.get_or_create_group(&root, "a/b"),
            Err(StoreError::InvalidName { .. })
        ));
        assert!(matches!(
            store.write_float(&root, "", 1.0),
            Err(StoreError::InvalidName { .. })
        ));
    }
}
