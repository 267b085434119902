//! Skeleton collection
//!
//! All skeletons of one dataset, indexed by label. A collection is only ever
//! produced whole: a load either yields every label in `0..max_label` or fails.

use std::io::{Read, Write};

use tracing::debug;

use crate::error::Result;
use crate::formats::{read_skeleton_pair, write_skeleton_pair};
use crate::grid::{GridSize, Resolution, SkeletonPoint};
use crate::meta::MetadataResolver;
use crate::paths::SkeletonPaths;
use crate::record::{LabelPoints, Skeleton};

#[derive(Debug, Clone, PartialEq)]
pub struct SkeletonCollection {
    skeletons: Vec<Skeleton>,
    resolution: Resolution,
    grid_size: GridSize,
}

/// Aggregate counts over a collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectionSummary {
    pub labels: u64,
    pub non_empty_labels: u64,
    pub joints: u64,
    pub endpoints: u64,
}

impl SkeletonCollection {
    /// Skeletons must be label-ordered and share `resolution` / `grid_size`.
    pub(crate) fn from_validated(
        skeletons: Vec<Skeleton>,
        resolution: Resolution,
        grid_size: GridSize,
    ) -> Self {
        Self {
            skeletons,
            resolution,
            grid_size,
        }
    }

    /// Build a collection from per-label point sets; label n is `labels[n]`.
    pub fn from_labels(
        resolution: Resolution,
        grid_size: GridSize,
        labels: Vec<LabelPoints>,
    ) -> Result<Self> {
        let skeletons = labels
            .into_iter()
            .enumerate()
            .map(|(label, LabelPoints { points, vectors })| {
                let (joints, endpoints): (Vec<SkeletonPoint>, Vec<SkeletonPoint>) =
                    points.into_iter().partition(|p| !p.is_endpoint());
                Skeleton::new(
                    label as u64,
                    joints.iter().map(SkeletonPoint::index).collect(),
                    endpoints.iter().map(SkeletonPoint::index).collect(),
                    vectors,
                    resolution,
                    grid_size,
                )
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::from_validated(skeletons, resolution, grid_size))
    }

    /// Resolve a dataset's metadata and load its skeleton file pair.
    pub fn load(resolver: &dyn MetadataResolver, dataset: &str) -> Result<Self> {
        let meta = resolver.resolve(dataset)?;
        let paths = SkeletonPaths::for_dataset(&meta);
        debug!(
            dataset,
            points = %paths.points.display(),
            vectors = %paths.vectors.display(),
            "loading skeletons"
        );
        Self::open(&paths, meta.resolution, Some(meta.grid_size))
    }

    /// Load from an explicit file pair. Both handles are released before
    /// this returns, whether or not decoding succeeded.
    pub fn open(
        paths: &SkeletonPaths,
        resolution: Resolution,
        expected_grid: Option<GridSize>,
    ) -> Result<Self> {
        let (points, vectors) = paths.open()?;
        let collection = read_skeleton_pair(points, vectors, resolution, expected_grid)?;
        debug!(labels = collection.len(), "loaded skeleton collection");
        Ok(collection)
    }

    /// Decode from any pair of readers.
    pub fn read<P: Read, V: Read>(
        points: P,
        vectors: V,
        resolution: Resolution,
        expected_grid: Option<GridSize>,
    ) -> Result<Self> {
        read_skeleton_pair(points, vectors, resolution, expected_grid)
    }

    /// Encode to any pair of writers.
    pub fn write_to<P: Write, V: Write>(&self, points: P, vectors: V) -> Result<()> {
        write_skeleton_pair(points, vectors, self.grid_size, &self.to_label_points())
    }

    /// Write the collection as a new file pair.
    pub fn write(&self, paths: &SkeletonPaths) -> Result<()> {
        let labels = self.to_label_points();
        paths.write_with(|points, vectors| {
            write_skeleton_pair(points, vectors, self.grid_size, &labels)
        })
    }

    pub fn to_label_points(&self) -> Vec<LabelPoints> {
        self.skeletons.iter().map(LabelPoints::from).collect()
    }

    pub fn get(&self, label: u64) -> Option<&Skeleton> {
        usize::try_from(label)
            .ok()
            .and_then(|i| self.skeletons.get(i))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Skeleton> {
        self.skeletons.iter()
    }

    /// Skeletons with at least one point
    pub fn non_empty(&self) -> impl Iterator<Item = &Skeleton> {
        self.skeletons.iter().filter(|s| !s.is_empty())
    }

    pub fn len(&self) -> usize {
        self.skeletons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skeletons.is_empty()
    }

    pub fn max_label(&self) -> u64 {
        self.skeletons.len() as u64
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn grid_size(&self) -> GridSize {
        self.grid_size
    }

    pub fn as_slice(&self) -> &[Skeleton] {
        &self.skeletons
    }

    pub fn into_vec(self) -> Vec<Skeleton> {
        self.skeletons
    }

    pub fn summary(&self) -> CollectionSummary {
        self.skeletons
            .iter()
            .fold(CollectionSummary::default(), |mut acc, s| {
                acc.labels += 1;
                acc.non_empty_labels += u64::from(!s.is_empty());
                acc.joints += s.joints().len() as u64;
                acc.endpoints += s.endpoints().len() as u64;
                acc
            })
    }
}

impl<'a> IntoIterator for &'a SkeletonCollection {
    type Item = &'a Skeleton;
    type IntoIter = std::slice::Iter<'a, Skeleton>;

    fn into_iter(self) -> Self::IntoIter {
        self.skeletons.iter()
    }
}

#[cfg(test)]
mod tests {
    use glam::DVec3;

    use super::*;
    use crate::error::SkeletonError;

    const GRID: GridSize = GridSize::new(2, 3, 4);
    const RES: Resolution = Resolution::new(30.0, 6.0, 6.0);

    fn sample() -> SkeletonCollection {
        SkeletonCollection::from_labels(
            RES,
            GRID,
            vec![
                LabelPoints::default(),
                LabelPoints::new(
                    vec![
                        SkeletonPoint::Endpoint(0),
                        SkeletonPoint::Joint(1),
                        SkeletonPoint::Joint(2),
                        SkeletonPoint::Endpoint(3),
                    ],
                    [(0, DVec3::NEG_X), (3, DVec3::X)].into_iter().collect(),
                ),
                LabelPoints::new(vec![SkeletonPoint::Joint(23)], Default::default()),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_from_labels_assigns_labels_by_position() {
        let collection = sample();
        assert_eq!(collection.len(), 3);
        assert_eq!(collection.max_label(), 3);
        for (position, skeleton) in collection.iter().enumerate() {
            assert_eq!(skeleton.label(), position as u64);
            assert_eq!(skeleton.grid_size(), GRID);
            assert_eq!(skeleton.resolution(), RES);
        }
        assert!(collection.get(3).is_none());
    }

    #[test]
    fn test_from_labels_propagates_label_errors() {
        let err = SkeletonCollection::from_labels(
            RES,
            GRID,
            vec![
                LabelPoints::default(),
                LabelPoints::new(vec![SkeletonPoint::Endpoint(1)], Default::default()),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, SkeletonError::MissingVector { label: 1, .. }));
    }

    #[test]
    fn test_summary() {
        let summary = sample().summary();
        assert_eq!(
            summary,
            CollectionSummary {
                labels: 3,
                non_empty_labels: 2,
                joints: 3,
                endpoints: 2,
            }
        );
        assert_eq!(sample().non_empty().count(), 2);
    }

    #[test]
    fn test_in_memory_roundtrip() {
        let collection = sample();
        let mut pts = Vec::new();
        let mut vec = Vec::new();
        collection.write_to(&mut pts, &mut vec).unwrap();

        let loaded = SkeletonCollection::read(&pts[..], &vec[..], RES, Some(GRID)).unwrap();
        assert_eq!(loaded, collection);
    }
}
