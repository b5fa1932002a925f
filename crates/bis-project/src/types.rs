//! Node types stored in a project tree.

use std::collections::BTreeMap;

use rkyv::{Archive, Deserialize, Serialize};

/// Current container envelope version.
///
/// Increment this when making breaking changes to the on-disk layout.
/// The loader will reject files with version > CONTAINER_VERSION.
pub const CONTAINER_VERSION: u32 = 1;

/// Magic bytes at the start of .bis files.
///
/// Format: "BIS" + version byte (0x01 for v1)
pub const MAGIC_BYTES: [u8; 4] = [b'B', b'I', b'S', 0x01];

/// One node in the project tree.
#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize)]
#[rkyv(compare(PartialEq))]
pub enum Node {
    /// A named collection of child nodes.
    Group,
    /// A single typed value.
    Scalar(ScalarValue),
    /// A shaped block of raw bytes with string attributes.
    Array(ArrayDataset),
}

/// Typed scalar payload.
#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize)]
#[rkyv(compare(PartialEq))]
pub enum ScalarValue {
    Float(f64),
    Text(String),
}

/// A shaped array dataset.
///
/// The bytes are stored exactly as handed in; the store never reorders or
/// reinterprets them. Side metadata (such as axis tags) travels in the
/// string attribute map.
#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize)]
#[rkyv(compare(PartialEq))]
pub struct ArrayDataset {
    /// Extent along each dimension.
    pub shape: Vec<u64>,
    /// Raw element bytes, verbatim.
    pub data: Vec<u8>,
    /// String attributes attached to the dataset.
    pub attrs: BTreeMap<String, String>,
}

impl ArrayDataset {
    /// Create a dataset with no attributes.
    pub fn new(shape: Vec<u64>, data: Vec<u8>) -> Self {
        Self {
            shape,
            data,
            attrs: BTreeMap::new(),
        }
    }

    /// Attach a string attribute.
    #[must_use]
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    /// Look up a string attribute.
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }
}
