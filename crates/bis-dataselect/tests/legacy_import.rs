//! Integration tests for the legacy (v0.5) import adapter.

use std::path::Path;

use bis_dataselect::{
    AppletSerializer, DataSelectionOp, DatasetInfo, LEGACY_DATA_GROUP,
    LegacyDataSelectionImporter, StorageLocation,
};
use bis_project::{ArrayDataset, LEGACY_PROJECT_VERSION, ProjectHandle, ProjectStore};

const PROJECT_PATH: &str = "/archive/old_study.bis";

/// A legacy-layout store with one `DataSets/<name>/data` entry per name.
fn legacy_project(entries: &[&str]) -> ProjectHandle {
    let mut store = ProjectStore::with_format_version(LEGACY_PROJECT_VERSION);
    let root = ProjectStore::root();
    let data_group = store.get_or_create_group(&root, LEGACY_DATA_GROUP).unwrap();
    for name in entries {
        let entry = store.create_child_group(&data_group, name).unwrap();
        store
            .create_array(&entry, "data", ArrayDataset::new(vec![2], vec![1, 2]))
            .unwrap();
    }
    ProjectHandle::new(store)
}

#[test]
fn test_import_synthesizes_external_descriptors() {
    let project = legacy_project(&["dataItem00", "dataItem01"]);
    let importer = LegacyDataSelectionImporter::new();

    let mut op = DataSelectionOp::new();
    importer
        .deserialize_from_project(&mut op, &project, Path::new(PROJECT_PATH))
        .unwrap();

    assert_eq!(op.len(), 2);
    for (index, name) in ["dataItem00", "dataItem01"].iter().enumerate() {
        let info = op.dataset(index).unwrap();
        assert_eq!(info.location(), StorageLocation::FileSystem);
        // The old entry name is adopted as the id, preserving identity.
        assert_eq!(info.dataset_id().as_str(), *name);
        assert_eq!(
            info.file_path(),
            format!("{PROJECT_PATH}/DataSets/{name}/data")
        );
    }

    assert_eq!(op.working_directory().unwrap(), Path::new("/archive"));
    assert!(op.project_file().unwrap().ptr_eq(&project));
}

#[test]
fn test_entries_are_imported_in_sorted_order() {
    let project = legacy_project(&["dataItem02", "dataItem00", "dataItem01"]);
    let importer = LegacyDataSelectionImporter::new();

    let mut op = DataSelectionOp::new();
    importer
        .deserialize_from_project(&mut op, &project, Path::new(PROJECT_PATH))
        .unwrap();

    let ids: Vec<&str> = (0..op.len())
        .map(|index| op.dataset(index).unwrap().dataset_id().as_str())
        .collect();
    assert_eq!(ids, vec!["dataItem00", "dataItem01", "dataItem02"]);
}

#[test]
fn test_non_legacy_versions_are_ignored() {
    // A current-format project must pass through the importer untouched.
    let project = ProjectHandle::new(ProjectStore::new());
    let importer = LegacyDataSelectionImporter::new();

    let mut op = DataSelectionOp::new();
    op.resize(1);
    op.set_dataset(0, DatasetInfo::new("a.tif", StorageLocation::FileSystem));

    importer
        .deserialize_from_project(&mut op, &project, Path::new(PROJECT_PATH))
        .unwrap();

    assert_eq!(op.len(), 1);
    assert!(op.project_file().is_none());
}

#[test]
fn test_missing_collection_is_an_empty_project() {
    let project =
        ProjectHandle::new(ProjectStore::with_format_version(LEGACY_PROJECT_VERSION));
    let importer = LegacyDataSelectionImporter::new();

    let mut op = DataSelectionOp::new();
    op.resize(2);
    importer
        .deserialize_from_project(&mut op, &project, Path::new(PROJECT_PATH))
        .unwrap();
    assert!(op.is_empty());
}

#[test]
fn test_serialize_is_a_no_op() {
    let project = legacy_project(&["dataItem00"]);
    let importer = LegacyDataSelectionImporter::new();
    let snapshot = project.read().clone();

    let mut op = DataSelectionOp::new();
    importer
        .serialize_to_project(&mut op, &project, Path::new(PROJECT_PATH))
        .unwrap();
    assert_eq!(*project.read(), snapshot);
}

#[test]
fn test_unload_clears_imported_state() {
    let project = legacy_project(&["dataItem00"]);
    let importer = LegacyDataSelectionImporter::new();

    let mut op = DataSelectionOp::new();
    importer
        .deserialize_from_project(&mut op, &project, Path::new(PROJECT_PATH))
        .unwrap();
    assert_eq!(op.len(), 1);

    importer.unload(&mut op);
    assert!(op.is_empty());
}
