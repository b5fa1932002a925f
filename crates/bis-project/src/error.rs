//! Store error types.

use std::path::PathBuf;
use thiserror::Error;

/// Project store operation error.
#[derive(Debug, Error)]
pub enum StoreError {
    /// File I/O error.
    #[error("Failed to {operation} file: {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid file format (not a .bis file).
    #[error("Invalid project file format")]
    InvalidFormat { path: PathBuf, reason: String },

    /// Unsupported container version.
    #[error("Project container version {found} is not supported (maximum: {max_supported})")]
    UnsupportedContainerVersion {
        found: u32,
        max_supported: u32,
        path: PathBuf,
    },

    /// Serialization error.
    #[error("Failed to serialize project store")]
    Serialization {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Deserialization error.
    #[error("Failed to deserialize project store")]
    Deserialization {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Atomic write failed (temp file couldn't be renamed).
    #[error("Failed to complete save operation")]
    AtomicWriteFailed {
        temp_path: PathBuf,
        target_path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No node exists at the given path.
    #[error("No node at '{path}'")]
    NotFound { path: String },

    /// A node already exists at the given path.
    #[error("Node '{path}' already exists")]
    AlreadyExists { path: String },

    /// The node at the given path is not a group.
    #[error("Node '{path}' is not a group")]
    NotAGroup { path: String },

    /// The node at the given path is not a scalar.
    #[error("Node '{path}' is not a scalar")]
    NotAScalar { path: String },

    /// The node at the given path is not an array dataset.
    #[error("Node '{path}' is not an array dataset")]
    NotAnArray { path: String },

    /// A scalar holds a different value type than requested.
    #[error("Scalar '{path}' does not hold a {expected} value")]
    ScalarTypeMismatch {
        path: String,
        expected: &'static str,
    },

    /// Node names must be non-empty and must not contain '/'.
    #[error("Invalid node name: {name:?}")]
    InvalidName { name: String },
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
