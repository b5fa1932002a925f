//! Property test: save/load preserves arbitrary descriptor lists.

use std::path::Path;

use proptest::prelude::{any, proptest};

use bis_dataselect::{
    AppletSerializer, AxisTags, DataSelectionOp, DataSelectionSerializer, DatasetInfo,
    ImageVolume, StorageLocation,
};
use bis_project::{ProjectHandle, ProjectStore};

proptest! {
    #[test]
    fn prop_round_trip_preserves_descriptors(
        specs in proptest::collection::vec(
            (any::<bool>(), "[a-z]{1,8}\\.tif", proptest::collection::vec(any::<u8>(), 1..32)),
            0..6,
        )
    ) {
        let project = ProjectHandle::new(ProjectStore::new());
        let serializer = DataSelectionSerializer::new();

        let mut op = DataSelectionOp::new();
        op.resize(specs.len());
        for (index, (internal, file_path, bytes)) in specs.iter().enumerate() {
            let location = if *internal {
                StorageLocation::ProjectInternal
            } else {
                StorageLocation::FileSystem
            };
            op.set_dataset(index, DatasetInfo::new(file_path.clone(), location));
            if *internal {
                op.supply_image(
                    index,
                    ImageVolume::new(
                        vec![bytes.len() as u64],
                        bytes.clone(),
                        AxisTags::default(),
                    ),
                );
            }
        }
        let originals: Vec<DatasetInfo> = (0..op.len())
            .map(|index| op.dataset(index).unwrap().clone())
            .collect();

        serializer
            .serialize_to_project(&mut op, &project, Path::new("/tmp/prop.bis"))
            .unwrap();

        let mut fresh = DataSelectionOp::new();
        serializer
            .deserialize_from_project(&mut fresh, &project, Path::new("/tmp/prop.bis"))
            .unwrap();

        assert_eq!(fresh.len(), originals.len());
        for (index, original) in originals.iter().enumerate() {
            assert_eq!(fresh.dataset(index).unwrap(), original);
        }
    }
}
