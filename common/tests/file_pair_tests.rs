//! On-disk tests for the skeleton file pair.

use std::fs;
use std::path::Path;

use glam::DVec3;
use hashbrown::HashMap;
use skelvox_common::*;

const GRID: GridSize = GridSize::new(2, 2, 2);
const RES: Resolution = Resolution::new(30.0, 6.0, 6.0);

fn words(values: &[i64]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

fn dataset(root: &Path) -> (StaticMetadataResolver, SkeletonPaths) {
    let mut meta = DatasetMeta::new("toy", RES, GRID);
    meta.skeletons.root = root.to_path_buf();
    let paths = SkeletonPaths::for_dataset(&meta);
    (StaticMetadataResolver::new().with(meta), paths)
}

fn write_raw(paths: &SkeletonPaths, points: &[u8], vectors: &[u8]) {
    fs::create_dir_all(paths.points.parent().unwrap()).unwrap();
    fs::write(&paths.points, points).unwrap();
    fs::write(&paths.vectors, vectors).unwrap();
}

// ============================================================================
// Round Trip
// ============================================================================

#[test]
fn test_worked_example_pair() {
    let dir = tempfile::tempdir().unwrap();
    let (resolver, paths) = dataset(dir.path());

    let mut vectors = words(&[2, 2, 2, 1, 1, 7]);
    for component in [1.0f64, 0.0, 0.0] {
        vectors.extend(component.to_le_bytes());
    }
    write_raw(&paths, &words(&[2, 2, 2, 1, 3, 0, 1, -8]), &vectors);

    let collection = SkeletonCollection::load(&resolver, "toy").unwrap();
    assert_eq!(collection.len(), 1);

    // stored as (vz, vy, vx) = (1, 0, 0)
    let expected_vectors: HashMap<u64, DVec3> =
        [(7, DVec3::new(0.0, 0.0, 1.0))].into_iter().collect();
    let expected = Skeleton::new(0, vec![0, 1], vec![7], expected_vectors, RES, GRID).unwrap();
    assert_eq!(collection.get(0), Some(&expected));
}

#[test]
fn test_roundtrip_through_files() {
    let dir = tempfile::tempdir().unwrap();
    let grid = GridSize::new(3, 4, 5);
    let mut meta = DatasetMeta::new("chain", RES, grid);
    meta.skeletons.root = dir.path().to_path_buf();
    let paths = SkeletonPaths::for_dataset(&meta);
    let resolver = StaticMetadataResolver::new().with(meta);

    // label 1: a straight run along x in slice (1, 2); label 2 empty; label 3 one joint
    let row: Vec<u64> = (0..5)
        .map(|x| grid.flatten(GridCoord::new(1, 2, x)).unwrap())
        .collect();
    let chain: Vec<SkeletonPoint> = row
        .iter()
        .enumerate()
        .map(|(i, &index)| {
            if i == 0 || i == row.len() - 1 {
                SkeletonPoint::Endpoint(index)
            } else {
                SkeletonPoint::Joint(index)
            }
        })
        .collect();

    let labels = vec![
        LabelPoints::default(),
        LabelPoints::with_estimated_vectors(grid, chain).unwrap(),
        LabelPoints::default(),
        LabelPoints::new(vec![SkeletonPoint::Joint(59)], HashMap::new()),
    ];
    let original = SkeletonCollection::from_labels(RES, grid, labels).unwrap();
    original.write(&paths).unwrap();
    assert!(paths.exists());

    let loaded = SkeletonCollection::load(&resolver, "chain").unwrap();
    assert_eq!(loaded, original);

    let chain = loaded.get(1).unwrap();
    assert_eq!(chain.joints(), &row[1..4]);
    assert_eq!(chain.endpoints(), &[row[0], row[4]]);
    assert_eq!(chain.vector(row[0]), Some(DVec3::NEG_X));
    assert_eq!(chain.vector(row[4]), Some(DVec3::X));
    assert_eq!(
        chain.endpoint_coords().unwrap(),
        vec![GridCoord::new(1, 2, 0), GridCoord::new(1, 2, 4)]
    );
    assert!(loaded.get(2).unwrap().is_empty());
}

// ============================================================================
// Load Failures
// ============================================================================

#[test]
fn test_mismatched_label_count_fails_whole_load() {
    let dir = tempfile::tempdir().unwrap();
    let (resolver, paths) = dataset(dir.path());
    write_raw(
        &paths,
        &words(&[2, 2, 2, 2, 0, 0]),
        &words(&[2, 2, 2, 3, 0, 0, 0]),
    );

    let err = SkeletonCollection::load(&resolver, "toy").unwrap_err();
    assert!(matches!(err, SkeletonError::FormatMismatch { points, vectors }
        if points.max_label == 2 && vectors.max_label == 3));
}

#[test]
fn test_count_mismatch_reports_label() {
    let dir = tempfile::tempdir().unwrap();
    let (resolver, paths) = dataset(dir.path());
    // label 0 fine, label 1 has one endpoint but the vectors file lists none
    write_raw(
        &paths,
        &words(&[2, 2, 2, 2, 0, 1, -1]),
        &words(&[2, 2, 2, 2, 0, 0]),
    );

    let err = SkeletonCollection::load(&resolver, "toy").unwrap_err();
    assert!(matches!(err, SkeletonError::CountMismatch { label: 1, .. }));
    assert_eq!(err.label(), Some(1));
}

#[test]
fn test_truncated_points_file() {
    let dir = tempfile::tempdir().unwrap();
    let (resolver, paths) = dataset(dir.path());
    write_raw(
        &paths,
        &words(&[2, 2, 2, 1, 3, 0, 1]),
        &words(&[2, 2, 2, 1, 0]),
    );

    let err = SkeletonCollection::load(&resolver, "toy").unwrap_err();
    assert!(matches!(
        err,
        SkeletonError::TruncatedStream {
            stream: StreamRole::Points,
            ..
        }
    ));
}

#[test]
fn test_header_grid_must_match_metadata() {
    let dir = tempfile::tempdir().unwrap();
    let (resolver, paths) = dataset(dir.path());
    write_raw(&paths, &words(&[4, 4, 4, 0]), &words(&[4, 4, 4, 0]));

    let err = SkeletonCollection::load(&resolver, "toy").unwrap_err();
    assert!(matches!(err, SkeletonError::GridSizeMismatch { expected, .. } if expected == GRID));
}

#[test]
fn test_missing_vectors_file() {
    let dir = tempfile::tempdir().unwrap();
    let (resolver, paths) = dataset(dir.path());
    fs::create_dir_all(paths.points.parent().unwrap()).unwrap();
    fs::write(&paths.points, words(&[2, 2, 2, 0])).unwrap();

    let err = SkeletonCollection::load(&resolver, "toy").unwrap_err();
    assert!(matches!(err, SkeletonError::File { ref path, .. } if *path == paths.vectors));
}

#[test]
fn test_unknown_dataset() {
    let dir = tempfile::tempdir().unwrap();
    let (resolver, _) = dataset(dir.path());
    assert!(matches!(
        SkeletonCollection::load(&resolver, "nope"),
        Err(SkeletonError::Metadata { .. })
    ));
}

// ============================================================================
// Write Behaviour
// ============================================================================

#[test]
fn test_failed_write_leaves_no_files() {
    let dir = tempfile::tempdir().unwrap();
    let (_, paths) = dataset(dir.path());

    let labels = vec![LabelPoints::new(
        vec![SkeletonPoint::Endpoint(1)],
        HashMap::new(),
    )];
    let err = paths
        .write_with(|points, vectors| write_skeleton_pair(points, vectors, GRID, &labels))
        .unwrap_err();
    assert!(matches!(err, SkeletonError::MissingVector { .. }));

    assert!(!paths.points.exists());
    assert!(!paths.vectors.exists());
    let leftovers = fs::read_dir(paths.points.parent().unwrap()).unwrap().count();
    assert_eq!(leftovers, 0);
}

#[test]
fn test_failed_vectors_rename_unpublishes_points() {
    let dir = tempfile::tempdir().unwrap();
    let (_, paths) = dataset(dir.path());

    // a directory squatting on the vectors name makes the second rename fail
    fs::create_dir_all(paths.vectors.join("occupied")).unwrap();

    let collection = SkeletonCollection::from_labels(
        RES,
        GRID,
        vec![LabelPoints::new(vec![SkeletonPoint::Joint(2)], HashMap::new())],
    )
    .unwrap();
    let err = collection.write(&paths).unwrap_err();
    assert!(matches!(err, SkeletonError::File { ref path, .. } if *path == paths.vectors));

    assert!(!paths.points.exists());
    assert!(paths.vectors.is_dir());
    let names: Vec<_> = fs::read_dir(paths.points.parent().unwrap())
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .collect();
    assert_eq!(names, vec![paths.vectors.file_name().unwrap().to_os_string()]);
}

#[test]
fn test_toml_metadata_drives_load() {
    let dir = tempfile::tempdir().unwrap();
    let meta_dir = dir.path().join("meta");
    let skel_root = dir.path().join("skeletons");
    fs::create_dir_all(&meta_dir).unwrap();
    fs::write(
        meta_dir.join("toy.toml"),
        format!(
            "resolution = [30.0, 6.0, 6.0]\ngrid_size = [2, 2, 2]\n\n[skeletons]\nroot = {:?}\n",
            skel_root.to_string_lossy()
        ),
    )
    .unwrap();

    let resolver = TomlMetadataResolver::new(&meta_dir);
    let meta = resolver.resolve("toy").unwrap();
    let original = SkeletonCollection::from_labels(
        meta.resolution,
        meta.grid_size,
        vec![LabelPoints::new(
            vec![SkeletonPoint::Joint(2), SkeletonPoint::Endpoint(3)],
            [(3, DVec3::Y)].into_iter().collect(),
        )],
    )
    .unwrap();
    original.write(&SkeletonPaths::for_dataset(&meta)).unwrap();

    let loaded = SkeletonCollection::load(&resolver, "toy").unwrap();
    assert_eq!(loaded, original);
    assert_eq!(loaded.resolution(), RES);
}
