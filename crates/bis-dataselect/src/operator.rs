//! The data-selection operator collaborator.
//!
//! The operator owns the ordered list of dataset slots the GUI edits and
//! the wider workflow consumes. The serializer reads and writes this
//! state; it never owns it. Realized image data flows through here as
//! well: ingest supplies it when a dataset is first selected, and after
//! an embedding save the bound project file becomes the source of truth.

use std::fs;
use std::path::{Path, PathBuf};

use bis_project::{ProjectHandle, ProjectStore};

use crate::axistags::AxisTags;
use crate::error::{DataSelectionError, Result};
use crate::info::{DatasetInfo, StorageLocation};
use crate::serializer::{AXISTAGS_ATTR, LOCAL_DATA_GROUP, TOP_GROUP_NAME};

/// A fully realized image volume with attached axis metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageVolume {
    /// Extent along each dimension.
    pub shape: Vec<u64>,
    /// Raw element bytes in producer order.
    pub data: Vec<u8>,
    /// Semantic ordering of the dimensions.
    pub axistags: AxisTags,
}

impl ImageVolume {
    pub fn new(shape: Vec<u64>, data: Vec<u8>, axistags: AxisTags) -> Self {
        Self {
            shape,
            data,
            axistags,
        }
    }
}

#[derive(Debug, Default)]
struct DatasetSlot {
    info: Option<DatasetInfo>,
    /// Realized output, either supplied by ingest or cached from a read.
    image: Option<ImageVolume>,
}

/// Operator holding the user's dataset selections.
#[derive(Debug, Default)]
pub struct DataSelectionOp {
    slots: Vec<DatasetSlot>,
    project_file: Option<ProjectHandle>,
    working_directory: Option<PathBuf>,
}

impl DataSelectionOp {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of dataset slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Grow or shrink the slot list. New slots start unconfigured.
    pub fn resize(&mut self, len: usize) {
        self.slots.resize_with(len, DatasetSlot::default);
    }

    /// The descriptor in a slot, if one has been assigned.
    pub fn dataset(&self, index: usize) -> Option<&DatasetInfo> {
        self.slots.get(index).and_then(|slot| slot.info.as_ref())
    }

    /// Assign a descriptor to a slot.
    ///
    /// Reassignment drops the slot's cached image, which is what forces
    /// downstream consumers to recompute from the new value.
    ///
    /// # Panics
    ///
    /// Panics if the slot does not exist; callers resize first.
    pub fn set_dataset(&mut self, index: usize, info: DatasetInfo) {
        assert!(index < self.slots.len(), "dataset slot {index} out of range");
        self.slots[index] = DatasetSlot {
            info: Some(info),
            image: None,
        };
    }

    /// Hand the operator the realized image for a slot.
    ///
    /// This is how ingest provides data for a dataset that has not been
    /// embedded in any project yet.
    ///
    /// # Panics
    ///
    /// Panics if the slot does not exist; callers resize first.
    pub fn supply_image(&mut self, index: usize, image: ImageVolume) {
        assert!(index < self.slots.len(), "dataset slot {index} out of range");
        self.slots[index].image = Some(image);
    }

    /// Realized image for a slot (blocking full read).
    ///
    /// Resolution order: the slot's supplied/cached image, then the bound
    /// project's embedded data for project-internal descriptors, then the
    /// external file for file-system descriptors.
    pub fn image(&mut self, index: usize) -> Result<ImageVolume> {
        let slot = self
            .slots
            .get(index)
            .ok_or(DataSelectionError::SlotNotConfigured { index })?;
        if let Some(image) = &slot.image {
            return Ok(image.clone());
        }
        let info = slot
            .info
            .clone()
            .ok_or(DataSelectionError::SlotNotConfigured { index })?;

        let realized = match info.location() {
            StorageLocation::ProjectInternal => self.internal_image(&info)?.ok_or_else(|| {
                DataSelectionError::MissingInternalData {
                    dataset_id: info.dataset_id().to_string(),
                }
            })?,
            StorageLocation::FileSystem => self.external_image(&info)?,
        };

        self.slots[index].image = Some(realized.clone());
        Ok(realized)
    }

    /// The project file this operator currently reads embedded data from.
    pub fn project_file(&self) -> Option<&ProjectHandle> {
        self.project_file.as_ref()
    }

    /// Bind (or rebind) the operator to an open project file.
    pub fn bind_project_file(&mut self, project: ProjectHandle) {
        self.project_file = Some(project);
    }

    /// Directory against which relative external paths resolve.
    pub fn working_directory(&self) -> Option<&Path> {
        self.working_directory.as_deref()
    }

    pub fn set_working_directory(&mut self, dir: impl Into<PathBuf>) {
        self.working_directory = Some(dir.into());
    }

    /// Resolve a descriptor path to an absolute-or-best-effort path.
    pub fn resolve_path(&self, file_path: &str) -> PathBuf {
        let path = Path::new(file_path);
        if path.is_absolute() {
            return path.to_path_buf();
        }
        match &self.working_directory {
            Some(dir) => dir.join(path),
            None => path.to_path_buf(),
        }
    }

    /// Embedded image for a descriptor, if the bound project has one.
    fn internal_image(&self, info: &DatasetInfo) -> Result<Option<ImageVolume>> {
        let Some(project) = &self.project_file else {
            return Ok(None);
        };
        let store = project.read();
        let root = ProjectStore::root();
        let Some(local_data) = store
            .group(&root, TOP_GROUP_NAME)
            .and_then(|top| store.group(&top, LOCAL_DATA_GROUP))
        else {
            return Ok(None);
        };
        if !store.contains(&local_data, info.dataset_id().as_str()) {
            return Ok(None);
        }
        let dataset = store.array(&local_data, info.dataset_id().as_str())?;
        let axistags = match dataset.attr(AXISTAGS_ATTR) {
            Some(json) => AxisTags::from_json(json)?,
            None => AxisTags::default(),
        };
        Ok(Some(ImageVolume::new(
            dataset.shape.clone(),
            dataset.data.clone(),
            axistags,
        )))
    }

    /// Raw bytes of an externally referenced dataset.
    ///
    /// Axis metadata is not recoverable from a bare file; ingest supplies
    /// it when the dataset is first selected.
    fn external_image(&self, info: &DatasetInfo) -> Result<ImageVolume> {
        let path = self.resolve_path(info.file_path());
        let data = fs::read(&path).map_err(|source| DataSelectionError::ExternalRead {
            path: path.clone(),
            source,
        })?;
        let len = data.len() as u64;
        Ok(ImageVolume::new(vec![len], data, AxisTags::default()))
    }
}
