//! One-way import of legacy (v0.5) project layouts.
//!
//! Legacy projects kept every dataset as a plain sibling entry under a
//! root `DataSets` collection, with no embedded-data area and no axis-tag
//! attributes. The importer synthesizes file-system descriptors that
//! point back into the old file and adopts the old entry names as
//! dataset ids, so identity survives the migration.

use std::path::Path;

use tracing::{debug, info};

use bis_project::{LEGACY_PROJECT_VERSION, ProjectHandle, ProjectStore};

use crate::error::Result;
use crate::info::{DatasetId, DatasetInfo, StorageLocation};
use crate::operator::DataSelectionOp;
use crate::serializer::{AppletSerializer, read_format_version};

/// Root collection name in the legacy layout.
pub const LEGACY_DATA_GROUP: &str = "DataSets";

/// Leaf dataset name inside each legacy entry.
const LEGACY_DATA_LEAF: &str = "data";

/// Deserializes the user's input data selections from a legacy project.
#[derive(Debug, Clone, Default)]
pub struct LegacyDataSelectionImporter;

impl LegacyDataSelectionImporter {
    pub fn new() -> Self {
        Self
    }
}

impl AppletSerializer for LegacyDataSelectionImporter {
    /// Import-only; legacy layouts are never written.
    fn serialize_to_project(
        &self,
        _op: &mut DataSelectionOp,
        _project: &ProjectHandle,
        _project_path: &Path,
    ) -> Result<()> {
        Ok(())
    }

    fn deserialize_from_project(
        &self,
        op: &mut DataSelectionOp,
        project: &ProjectHandle,
        project_path: &Path,
    ) -> Result<()> {
        // This importer handles exactly the legacy version, nothing else.
        let version = read_format_version(project)?;
        if version != LEGACY_PROJECT_VERSION {
            debug!(
                version,
                "not a legacy project, skipping data-selection import"
            );
            return Ok(());
        }

        // Relative external paths resolve against the project file's
        // directory.
        if let Some(dir) = project_path.parent() {
            op.set_working_directory(dir);
        }
        op.bind_project_file(project.clone());

        let imported: Vec<DatasetInfo> = {
            let store = project.read();
            let root = ProjectStore::root();
            let Some(data_group) = store.group(&root, LEGACY_DATA_GROUP) else {
                // No collection at all is a valid empty project.
                op.resize(0);
                return Ok(());
            };

            store
                .list_children(&data_group)?
                .into_iter()
                .map(|name| {
                    // Legacy data stays where it is; the descriptor
                    // references it externally, inside the old file.
                    let file_path = format!(
                        "{}/{LEGACY_DATA_GROUP}/{name}/{LEGACY_DATA_LEAF}",
                        project_path.display()
                    );
                    DatasetInfo::from_stored(
                        StorageLocation::FileSystem,
                        file_path,
                        DatasetId::from_name(name),
                    )
                })
                .collect()
        };

        op.resize(imported.len());
        for (index, dataset_info) in imported.into_iter().enumerate() {
            op.set_dataset(index, dataset_info);
        }
        info!(count = op.len(), "imported legacy data selection");
        Ok(())
    }

    /// Always false; an import never has unsaved state of its own.
    fn is_dirty(&self) -> bool {
        false
    }

    fn unload(&self, op: &mut DataSelectionOp) {
        op.resize(0);
    }
}
