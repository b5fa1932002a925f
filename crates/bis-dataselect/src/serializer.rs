//! Save/load translation between the operator and the project store.

use std::collections::BTreeSet;
use std::path::Path;

use tracing::{debug, info, warn};

use bis_project::{
    ArrayDataset, ProjectHandle, ProjectStore, StoreError, is_project_version_compatible,
};

use crate::error::{DataSelectionError, Result};
use crate::info::{DatasetId, DatasetInfo, StorageLocation};
use crate::operator::{DataSelectionOp, ImageVolume};

/// Default top-level group written by the data-selection serializer.
pub const TOP_GROUP_NAME: &str = "DataSelection";

/// Sub-schema version of the group layout under the top group.
pub const STORAGE_VERSION: f64 = 0.1;

pub(crate) const STORAGE_VERSION_KEY: &str = "StorageVersion";
pub(crate) const INFOS_GROUP: &str = "infos";
pub(crate) const LOCAL_DATA_GROUP: &str = "local_data";
pub(crate) const LOCATION_KEY: &str = "location";
pub(crate) const FILE_PATH_KEY: &str = "filePath";
pub(crate) const DATASET_ID_KEY: &str = "datasetId";
pub(crate) const AXISTAGS_ATTR: &str = "axistags";

/// Persistence protocol an applet's serializer implements.
///
/// The shell drives every applet through this seam when a project is
/// saved, opened, or closed. Operator and project are handed in
/// explicitly; serializers hold no ambient state.
pub trait AppletSerializer {
    /// Mirror the operator's state into the project store.
    fn serialize_to_project(
        &self,
        op: &mut DataSelectionOp,
        project: &ProjectHandle,
        project_path: &Path,
    ) -> Result<()>;

    /// Rebuild the operator's state from the project store.
    fn deserialize_from_project(
        &self,
        op: &mut DataSelectionOp,
        project: &ProjectHandle,
        project_path: &Path,
    ) -> Result<()>;

    /// Whether in-memory state has diverged from the stored groups.
    fn is_dirty(&self) -> bool;

    /// Reset the operator to the clean empty state.
    ///
    /// Called when the user closes the project, and after an aborted
    /// load, so no partially restored state lingers.
    fn unload(&self, op: &mut DataSelectionOp);
}

/// Serializes the user's input data selections to a project file.
#[derive(Debug, Clone)]
pub struct DataSelectionSerializer {
    top_group_name: String,
}

impl Default for DataSelectionSerializer {
    fn default() -> Self {
        Self::new()
    }
}

impl DataSelectionSerializer {
    pub fn new() -> Self {
        Self {
            top_group_name: TOP_GROUP_NAME.to_string(),
        }
    }

    /// Use a non-default top group (workflows that host several
    /// data-selection applets give each its own group).
    pub fn with_top_group(top_group_name: impl Into<String>) -> Self {
        Self {
            top_group_name: top_group_name.into(),
        }
    }

    pub fn top_group_name(&self) -> &str {
        &self.top_group_name
    }

    /// Project-internal descriptors whose bytes are not yet embedded.
    fn missing_internal_ids(
        &self,
        op: &DataSelectionOp,
        project: &ProjectHandle,
    ) -> Result<Vec<(usize, DatasetId)>> {
        let store = project.read();
        let root = ProjectStore::root();
        let local_data = store
            .group(&root, &self.top_group_name)
            .and_then(|top| store.group(&top, LOCAL_DATA_GROUP));

        let mut missing = Vec::new();
        for index in 0..op.len() {
            let info = op
                .dataset(index)
                .ok_or(DataSelectionError::SlotNotConfigured { index })?;
            if info.location() != StorageLocation::ProjectInternal {
                continue;
            }
            let present = local_data
                .as_ref()
                .is_some_and(|group| store.contains(group, info.dataset_id().as_str()));
            if !present {
                missing.push((index, info.dataset_id().clone()));
            }
        }
        Ok(missing)
    }
}

impl AppletSerializer for DataSelectionSerializer {
    fn serialize_to_project(
        &self,
        op: &mut DataSelectionOp,
        project: &ProjectHandle,
        _project_path: &Path,
    ) -> Result<()> {
        // Check the overall file version before touching any group.
        let version = read_format_version(project)?;
        if !is_project_version_compatible(version) {
            warn!(
                version,
                "project format version not supported, skipping data-selection save"
            );
            return Ok(());
        }

        // An operator bound to some other project file means unrelated
        // projects got cross-wired; that is a caller bug, not bad data.
        if let Some(bound) = op.project_file() {
            assert!(
                bound.ptr_eq(project),
                "data-selection operator is bound to a different project file"
            );
        }

        // Realize images that still need embedding before the store is
        // locked for writing. This blocks until upstream produces the
        // full array.
        let missing = self.missing_internal_ids(op, project)?;
        let mut embedded: Vec<(DatasetId, ImageVolume, String)> = Vec::with_capacity(missing.len());
        for (index, dataset_id) in missing {
            let image = op.image(index)?;
            let axistags_json = image.axistags.to_json()?;
            debug!(index, %dataset_id, "realized image for embedding");
            embedded.push((dataset_id, image, axistags_json));
        }

        let wrote_internal_data = !embedded.is_empty();
        {
            let mut store = project.write();
            let root = ProjectStore::root();
            let top = store.get_or_create_group(&root, &self.top_group_name)?;
            store.write_float(&top, STORAGE_VERSION_KEY, STORAGE_VERSION)?;

            // Rebuild the info list from scratch.
            let infos = store.get_or_create_group(&top, INFOS_GROUP)?;
            for name in store.list_children(&infos)? {
                store.delete_child(&infos, &name)?;
            }
            for index in 0..op.len() {
                let dataset_info = op
                    .dataset(index)
                    .ok_or(DataSelectionError::SlotNotConfigured { index })?;
                let info_group = store.create_child_group(&infos, &format!("info{index:03}"))?;
                store.write_text(&info_group, LOCATION_KEY, dataset_info.location().as_str())?;
                store.write_text(&info_group, FILE_PATH_KEY, dataset_info.file_path())?;
                store.write_text(
                    &info_group,
                    DATASET_ID_KEY,
                    dataset_info.dataset_id().as_str(),
                )?;
            }

            // Write the missing local datasets. The bytes go in verbatim
            // and the axis tags ride along as a side attribute, so the
            // element order on disk stays exactly what upstream produced.
            let local_data = store.get_or_create_group(&top, LOCAL_DATA_GROUP)?;
            for (dataset_id, image, axistags_json) in embedded {
                store.create_array(
                    &local_data,
                    dataset_id.as_str(),
                    ArrayDataset::new(image.shape, image.data)
                        .with_attr(AXISTAGS_ATTR, axistags_json),
                )?;
            }

            // Drop embedded data no current descriptor references.
            let referenced: BTreeSet<String> = (0..op.len())
                .filter_map(|index| op.dataset(index))
                .filter(|dataset_info| {
                    dataset_info.location() == StorageLocation::ProjectInternal
                })
                .map(|dataset_info| dataset_info.dataset_id().as_str().to_string())
                .collect();
            for name in store.list_children(&local_data)? {
                if !referenced.contains(&name) {
                    debug!(dataset_id = %name, "pruning unreferenced embedded dataset");
                    store.delete_child(&local_data, &name)?;
                }
            }
        }

        if wrote_internal_data {
            // Embedded data now lives in this project; subsequent reads
            // must come from it rather than the original external files.
            op.bind_project_file(project.clone());

            // Reassign the first slot so downstream consumers drop
            // outputs cached against the pre-save sources.
            if let Some(first) = op.dataset(0).cloned() {
                op.set_dataset(0, first);
            }
        }

        info!(
            count = op.len(),
            top_group = %self.top_group_name,
            "saved data selection to project"
        );
        Ok(())
    }

    fn deserialize_from_project(
        &self,
        op: &mut DataSelectionOp,
        project: &ProjectHandle,
        project_path: &Path,
    ) -> Result<()> {
        // Check the overall file version before touching any group.
        let version = read_format_version(project)?;
        if !is_project_version_compatible(version) {
            warn!(
                version,
                "project format version not supported, skipping data-selection load"
            );
            return Ok(());
        }

        // Relative external paths resolve against the project file's
        // directory.
        if let Some(dir) = project_path.parent() {
            op.set_working_directory(dir);
        }
        op.bind_project_file(project.clone());

        let reconstructed: Vec<DatasetInfo> = {
            let store = project.read();
            let root = ProjectStore::root();
            let Some(top) = store.group(&root, &self.top_group_name) else {
                // No group at all is a valid empty project.
                op.resize(0);
                return Ok(());
            };
            let Some(infos) = store.group(&top, INFOS_GROUP) else {
                op.resize(0);
                return Ok(());
            };
            let local_data = store.group(&top, LOCAL_DATA_GROUP);

            let mut list = Vec::new();
            for name in store.list_children(&infos)? {
                let info_group = store
                    .group(&infos, &name)
                    .ok_or_else(|| DataSelectionError::CorruptInfoEntry { name: name.clone() })?;

                let location: StorageLocation =
                    store.read_text(&info_group, LOCATION_KEY)?.parse()?;
                let file_path = store.read_text(&info_group, FILE_PATH_KEY)?.to_string();
                let dataset_id =
                    DatasetId::from_name(store.read_text(&info_group, DATASET_ID_KEY)?);

                // A project claiming internal storage without the stored
                // bytes is unrecoverable.
                if location == StorageLocation::ProjectInternal {
                    let present = local_data
                        .as_ref()
                        .is_some_and(|group| store.contains(group, dataset_id.as_str()));
                    if !present {
                        return Err(DataSelectionError::MissingInternalData {
                            dataset_id: dataset_id.to_string(),
                        });
                    }
                }

                list.push(DatasetInfo::from_stored(location, file_path, dataset_id));
            }
            list
        };

        op.resize(reconstructed.len());
        for (index, dataset_info) in reconstructed.into_iter().enumerate() {
            op.set_dataset(index, dataset_info);
        }
        info!(count = op.len(), "loaded data selection from project");
        Ok(())
    }

    /// Always false: per-field change tracking is not implemented, and
    /// the shell resaves this applet's state unconditionally.
    fn is_dirty(&self) -> bool {
        false
    }

    fn unload(&self, op: &mut DataSelectionOp) {
        op.resize(0);
    }
}

/// The project's format version, or a hard error if the scalar is gone.
pub(crate) fn read_format_version(project: &ProjectHandle) -> Result<f64> {
    let store = project.read();
    match store.format_version() {
        Ok(version) => Ok(version),
        Err(StoreError::NotFound { .. }) => Err(DataSelectionError::ProjectVersionMissing),
        Err(other) => Err(other.into()),
    }
}
