//! Dataset descriptors.

use std::fmt;
use std::str::FromStr;

use uuid::Uuid;

use crate::error::DataSelectionError;

/// Where a dataset's bytes live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageLocation {
    /// Referenced from a path on the file system.
    FileSystem,
    /// Embedded in the project file, keyed by dataset id.
    ProjectInternal,
}

impl StorageLocation {
    /// The fixed storage string for this location.
    ///
    /// This table is the wire format; [`FromStr`] is its exact inverse
    /// and rejects anything else.
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageLocation::FileSystem => "FileSystem",
            StorageLocation::ProjectInternal => "ProjectInternal",
        }
    }
}

impl fmt::Display for StorageLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageLocation {
    type Err = DataSelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FileSystem" => Ok(StorageLocation::FileSystem),
            "ProjectInternal" => Ok(StorageLocation::ProjectInternal),
            other => Err(DataSelectionError::UnknownLocation {
                value: other.to_string(),
            }),
        }
    }
}

/// Stable identity of one logical dataset.
///
/// The id doubles as the embedded-storage key, so it must survive edits,
/// copies, and save/load cycles unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DatasetId(String);

impl DatasetId {
    /// Mint a fresh id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Adopt an existing identity (deserialization, legacy import).
    pub fn from_name(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DatasetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Descriptor of one logical input dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetInfo {
    location: StorageLocation,
    /// For [`StorageLocation::FileSystem`], a path possibly relative to
    /// the working directory; informational once the data is embedded.
    file_path: String,
    dataset_id: DatasetId,
}

impl DatasetInfo {
    /// Describe a newly selected dataset. Mints a fresh id.
    pub fn new(file_path: impl Into<String>, location: StorageLocation) -> Self {
        Self {
            location,
            file_path: file_path.into(),
            dataset_id: DatasetId::generate(),
        }
    }

    /// Reconstruct a descriptor from stored fields.
    ///
    /// Takes the identity explicitly and never re-mints it; this is the
    /// only correct construction path during deserialization.
    pub fn from_stored(
        location: StorageLocation,
        file_path: impl Into<String>,
        dataset_id: DatasetId,
    ) -> Self {
        Self {
            location,
            file_path: file_path.into(),
            dataset_id,
        }
    }

    pub fn location(&self) -> StorageLocation {
        self.location
    }

    pub fn file_path(&self) -> &str {
        &self.file_path
    }

    pub fn dataset_id(&self) -> &DatasetId {
        &self.dataset_id
    }

    /// Change where the bytes should live. Identity is unaffected.
    pub fn set_location(&mut self, location: StorageLocation) {
        self.location = location;
    }

    /// Point the descriptor at a different source file.
    ///
    /// A different source is a different dataset, so this mints a new id.
    /// Every other mutation keeps the id stable.
    pub fn reassign_source(&mut self, file_path: impl Into<String>) {
        self.file_path = file_path.into();
        self.dataset_id = DatasetId::generate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_table_round_trips() {
        for location in [StorageLocation::FileSystem, StorageLocation::ProjectInternal] {
            assert_eq!(
                location.as_str().parse::<StorageLocation>().unwrap(),
                location
            );
        }
    }

    #[test]
    fn test_unknown_location_string_is_rejected() {
        let result = "SomewhereElse".parse::<StorageLocation>();
        assert!(matches!(
            result,
            Err(DataSelectionError::UnknownLocation { .. })
        ));
    }

    #[test]
    fn test_new_descriptors_get_distinct_ids() {
        let a = DatasetInfo::new("a.tif", StorageLocation::FileSystem);
        let b = DatasetInfo::new("a.tif", StorageLocation::FileSystem);
        assert_ne!(a.dataset_id(), b.dataset_id());
    }

    #[test]
    fn test_clone_and_field_updates_keep_id() {
        let mut info = DatasetInfo::new("a.tif", StorageLocation::FileSystem);
        let id = info.dataset_id().clone();

        let copy = info.clone();
        assert_eq!(copy.dataset_id(), &id);

        info.set_location(StorageLocation::ProjectInternal);
        assert_eq!(info.dataset_id(), &id);
    }

    #[test]
    fn test_reassign_source_mints_new_id() {
        let mut info = DatasetInfo::new("a.tif", StorageLocation::FileSystem);
        let id = info.dataset_id().clone();
        info.reassign_source("b.tif");
        assert_ne!(info.dataset_id(), &id);
        assert_eq!(info.file_path(), "b.tif");
    }

    #[test]
    fn test_from_stored_preserves_identity() {
        let info = DatasetInfo::from_stored(
            StorageLocation::ProjectInternal,
            "orig.tif",
            DatasetId::from_name("abc-123"),
        );
        assert_eq!(info.dataset_id().as_str(), "abc-123");
        assert_eq!(info.location(), StorageLocation::ProjectInternal);
    }
}
