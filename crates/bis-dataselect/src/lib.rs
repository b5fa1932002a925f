//! Data-selection state and its project-file serialization.
//!
//! The data-selection applet tracks which input datasets a project uses
//! and where their bytes live: referenced on the file system, or embedded
//! in the project file itself. This crate owns that model and the
//! translation between it and the project store:
//!
//! - `info.rs` - dataset descriptors (location, path, stable identity)
//! - `axistags.rs` - axis metadata attached to realized images
//! - `operator.rs` - the operator collaborator the descriptors live on
//! - `serializer.rs` - the save/load translation pass
//! - `legacy.rs` - one-way import of legacy (v0.5) project layouts
//!
//! # Persisted layout
//!
//! Under the project root, gated by the format version scalar:
//!
//! ```text
//! DataSelection/StorageVersion          float, sub-schema version
//! DataSelection/infos/info000..NNN      one group per descriptor
//!     location  filePath  datasetId     text scalars
//! DataSelection/local_data/<datasetId>  embedded bytes + axistags attr
//! ```
//!
//! The serializer rebuilds the info list from scratch on every save and
//! only writes embedded bytes that are not already present, so large
//! unchanged arrays are never rewritten.

mod axistags;
mod error;
mod info;
mod legacy;
mod operator;
mod serializer;

pub use axistags::{AxisTag, AxisTags};
pub use error::{DataSelectionError, Result};
pub use info::{DatasetId, DatasetInfo, StorageLocation};
pub use legacy::{LEGACY_DATA_GROUP, LegacyDataSelectionImporter};
pub use operator::{DataSelectionOp, ImageVolume};
pub use serializer::{
    AppletSerializer, DataSelectionSerializer, STORAGE_VERSION, TOP_GROUP_NAME,
};
