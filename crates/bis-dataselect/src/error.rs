//! Data-selection serialization error types.
//!
//! Version incompatibility and absent groups are deliberately NOT errors:
//! the former makes save/load a no-op, the latter is a valid empty
//! project. The variants here are the fatal cases — corrupt format,
//! missing embedded data, or callers handing the serializer an operator
//! in an unusable state.

use std::path::PathBuf;

use bis_project::StoreError;
use thiserror::Error;

/// Data-selection serialization error.
#[derive(Debug, Error)]
pub enum DataSelectionError {
    /// Underlying store operation failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The project file carries no format version scalar at all.
    #[error("Project file has no format version scalar")]
    ProjectVersionMissing,

    /// A stored location string is not in the fixed location table.
    #[error("Unrecognized storage location: {value:?}")]
    UnknownLocation { value: String },

    /// A descriptor claims project-internal storage but no embedded
    /// bytes exist under its id. Continuing would silently lose data.
    #[error("Dataset {dataset_id} is marked project-internal but has no stored data")]
    MissingInternalData { dataset_id: String },

    /// An info entry in the store is not a group.
    #[error("Info entry '{name}' is not a group")]
    CorruptInfoEntry { name: String },

    /// A dataset slot has no descriptor value.
    #[error("Dataset slot {index} has no descriptor")]
    SlotNotConfigured { index: usize },

    /// Reading an externally referenced dataset failed.
    #[error("Failed to read external dataset: {path}")]
    ExternalRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Axis-tag metadata failed to encode or decode.
    #[error("Invalid axis-tag metadata")]
    AxisTagsJson {
        #[source]
        source: serde_json::Error,
    },
}

/// Result type alias for data-selection operations.
pub type Result<T> = std::result::Result<T, DataSelectionError>;
