//! Command implementations for the project tool.

use anyhow::{Context, Result, bail};
use comfy_table::Table;
use tracing::info;

use bis_dataselect::{
    AppletSerializer, DataSelectionOp, DataSelectionSerializer, LegacyDataSelectionImporter,
};
use bis_project::{
    LEGACY_PROJECT_VERSION, ProjectHandle, ProjectStore, load_store, save_store,
};

use crate::cli::{ConvertArgs, InspectArgs, NewArgs};

pub fn run_new(args: &NewArgs) -> Result<()> {
    if args.project.exists() && !args.force {
        bail!(
            "{} already exists (use --force to overwrite)",
            args.project.display()
        );
    }

    let mut store = ProjectStore::new();
    save_store(&mut store, &args.project).context("write project file")?;
    println!("Created {}", args.project.display());
    Ok(())
}

pub fn run_inspect(args: &InspectArgs) -> Result<()> {
    let store = load_store(&args.project).context("open project file")?;
    let format_version = store
        .format_version()
        .context("read project format version")?;
    let created_at = store.created_at().to_string();
    let project = ProjectHandle::new(store);

    let mut op = DataSelectionOp::new();
    DataSelectionSerializer::new()
        .deserialize_from_project(&mut op, &project, &args.project)
        .context("read data selection")?;

    println!("Project:        {}", args.project.display());
    println!("Format version: {format_version}");
    println!("Created:        {created_at}");
    println!();

    let mut table = Table::new();
    table.set_header(vec!["#", "Location", "Path", "Dataset id"]);
    for index in 0..op.len() {
        if let Some(dataset) = op.dataset(index) {
            table.add_row(vec![
                index.to_string(),
                dataset.location().to_string(),
                dataset.file_path().to_string(),
                dataset.dataset_id().to_string(),
            ]);
        }
    }
    println!("{table}");
    Ok(())
}

pub fn run_convert(args: &ConvertArgs) -> Result<()> {
    let legacy = ProjectHandle::new(load_store(&args.input).context("open legacy project")?);
    let version = legacy
        .read()
        .format_version()
        .context("read project format version")?;
    if version != LEGACY_PROJECT_VERSION {
        bail!(
            "{} is not a v{LEGACY_PROJECT_VERSION} legacy project (found v{version})",
            args.input.display()
        );
    }

    let mut op = DataSelectionOp::new();
    LegacyDataSelectionImporter::new()
        .deserialize_from_project(&mut op, &legacy, &args.input)
        .context("import legacy data selection")?;
    info!(count = op.len(), "imported legacy data selection");

    // Mirror the imported selection into a fresh current-format project.
    // The operator must be rebound first; the importer left it bound to
    // the legacy store.
    let migrated = ProjectHandle::new(ProjectStore::new());
    op.bind_project_file(migrated.clone());
    DataSelectionSerializer::new()
        .serialize_to_project(&mut op, &migrated, &args.output)
        .context("write migrated data selection")?;

    save_store(&mut migrated.write(), &args.output).context("write project file")?;
    println!(
        "Migrated {} -> {}",
        args.input.display(),
        args.output.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{ConvertArgs, NewArgs};
    use bis_project::ArrayDataset;

    #[test]
    fn test_new_then_convert_refuses_non_legacy_input() {
        let dir = tempfile::tempdir().unwrap();
        let project = dir.path().join("fresh.bis");

        run_new(&NewArgs {
            project: project.clone(),
            force: false,
        })
        .unwrap();
        assert!(project.exists());

        let result = run_convert(&ConvertArgs {
            input: project,
            output: dir.path().join("out.bis"),
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_new_refuses_to_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let project = dir.path().join("fresh.bis");

        let args = NewArgs {
            project: project.clone(),
            force: false,
        };
        run_new(&args).unwrap();
        assert!(run_new(&args).is_err());

        run_new(&NewArgs {
            project,
            force: true,
        })
        .unwrap();
    }

    #[test]
    fn test_convert_migrates_legacy_entries() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("old.bis");
        let output = dir.path().join("new.bis");

        // Materialize a legacy-layout project on disk.
        let mut store = ProjectStore::with_format_version(LEGACY_PROJECT_VERSION);
        let root = ProjectStore::root();
        let data_group = store.get_or_create_group(&root, "DataSets").unwrap();
        for name in ["dataItem00", "dataItem01"] {
            let entry = store.create_child_group(&data_group, name).unwrap();
            store
                .create_array(&entry, "data", ArrayDataset::new(vec![1], vec![42]))
                .unwrap();
        }
        save_store(&mut store, &input).unwrap();

        run_convert(&ConvertArgs {
            input: input.clone(),
            output: output.clone(),
        })
        .unwrap();

        // The migrated file is a current-format project with the same
        // selections.
        let migrated = ProjectHandle::new(load_store(&output).unwrap());
        let mut op = DataSelectionOp::new();
        DataSelectionSerializer::new()
            .deserialize_from_project(&mut op, &migrated, &output)
            .unwrap();
        assert_eq!(op.len(), 2);
        assert_eq!(op.dataset(0).unwrap().dataset_id().as_str(), "dataItem00");
    }
}
