//! Skeleton record
//!
//! One labeled object's skeleton: its joints, its endpoints and one tangent
//! vector per endpoint. Records are immutable once built.

use glam::DVec3;
use hashbrown::{HashMap, HashSet};

use crate::error::{RangeError, Result, SkeletonError};
use crate::grid::{GridCoord, GridSize, Resolution, SkeletonPoint};
use crate::tangent::estimate_endpoint_vectors;

#[derive(Debug, Clone, PartialEq)]
pub struct Skeleton {
    label: u64,
    joints: Vec<u64>,
    endpoints: Vec<u64>,
    vectors: HashMap<u64, DVec3>,
    resolution: Resolution,
    grid_size: GridSize,
}

impl Skeleton {
    /// Build a record, checking every per-label invariant:
    /// indices inside the grid, no index listed twice or under both kinds,
    /// and exactly one vector per endpoint.
    pub fn new(
        label: u64,
        joints: Vec<u64>,
        endpoints: Vec<u64>,
        vectors: HashMap<u64, DVec3>,
        resolution: Resolution,
        grid_size: GridSize,
    ) -> Result<Self> {
        let mut seen = LabelIndexSet::new(label, grid_size);
        for &index in &joints {
            seen.insert(SkeletonPoint::Joint(index))?;
        }
        for &index in &endpoints {
            seen.insert(SkeletonPoint::Endpoint(index))?;
        }
        seen.check_vectors(&vectors)?;

        Ok(Self::from_validated(
            label, joints, endpoints, vectors, resolution, grid_size,
        ))
    }

    /// Caller has already enforced the invariants checked by [`Skeleton::new`].
    pub(crate) fn from_validated(
        label: u64,
        joints: Vec<u64>,
        endpoints: Vec<u64>,
        vectors: HashMap<u64, DVec3>,
        resolution: Resolution,
        grid_size: GridSize,
    ) -> Self {
        Self {
            label,
            joints,
            endpoints,
            vectors,
            resolution,
            grid_size,
        }
    }

    pub fn label(&self) -> u64 {
        self.label
    }

    pub fn joints(&self) -> &[u64] {
        &self.joints
    }

    pub fn endpoints(&self) -> &[u64] {
        &self.endpoints
    }

    pub fn vectors(&self) -> &HashMap<u64, DVec3> {
        &self.vectors
    }

    /// Tangent at an endpoint, `None` if `endpoint` is not one of this label's endpoints.
    pub fn vector(&self, endpoint: u64) -> Option<DVec3> {
        self.vectors.get(&endpoint).copied()
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn grid_size(&self) -> GridSize {
        self.grid_size
    }

    /// Total number of skeleton points
    pub fn len(&self) -> usize {
        self.joints.len() + self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty() && self.endpoints.is_empty()
    }

    /// Joints then endpoints, each in file order.
    pub fn points(&self) -> impl Iterator<Item = SkeletonPoint> + '_ {
        self.joints
            .iter()
            .map(|&i| SkeletonPoint::Joint(i))
            .chain(self.endpoints.iter().map(|&i| SkeletonPoint::Endpoint(i)))
    }

    pub fn joint_coords(&self) -> std::result::Result<Vec<GridCoord>, RangeError> {
        self.joints
            .iter()
            .map(|&i| self.grid_size.unflatten(i))
            .collect()
    }

    pub fn endpoint_coords(&self) -> std::result::Result<Vec<GridCoord>, RangeError> {
        self.endpoints
            .iter()
            .map(|&i| self.grid_size.unflatten(i))
            .collect()
    }

    /// Physical position of a grid index (voxel coordinate scaled by resolution).
    pub fn world_position(&self, index: u64) -> std::result::Result<DVec3, RangeError> {
        let coord = self.grid_size.unflatten(index)?;
        Ok(coord.as_dvec3() * self.resolution.as_dvec3())
    }
}

/// Classified points and endpoint vectors for one label, as handed over by
/// the thinning stage for writing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelPoints {
    /// Points in the order they are written to the points file
    pub points: Vec<SkeletonPoint>,
    /// One vector per endpoint index
    pub vectors: HashMap<u64, DVec3>,
}

impl LabelPoints {
    pub fn new(points: Vec<SkeletonPoint>, vectors: HashMap<u64, DVec3>) -> Self {
        Self { points, vectors }
    }

    /// Classified points with tangents estimated by walking the skeleton
    /// back from each endpoint.
    pub fn with_estimated_vectors(
        grid_size: GridSize,
        points: Vec<SkeletonPoint>,
    ) -> std::result::Result<Self, RangeError> {
        let vectors = estimate_endpoint_vectors(grid_size, &points)?;
        Ok(Self { points, vectors })
    }

    /// Endpoint indices in point order
    pub fn endpoints(&self) -> impl Iterator<Item = u64> + '_ {
        self.points
            .iter()
            .filter(|p| p.is_endpoint())
            .map(SkeletonPoint::index)
    }
}

impl From<&Skeleton> for LabelPoints {
    fn from(skeleton: &Skeleton) -> Self {
        Self {
            points: skeleton.points().collect(),
            vectors: skeleton.vectors.clone(),
        }
    }
}

/// Classified indices of one label, checked as they are added.
pub(crate) struct LabelIndexSet {
    label: u64,
    grid_size: GridSize,
    joints: HashSet<u64>,
    endpoints: HashSet<u64>,
}

impl LabelIndexSet {
    pub(crate) fn new(label: u64, grid_size: GridSize) -> Self {
        Self {
            label,
            grid_size,
            joints: HashSet::new(),
            endpoints: HashSet::new(),
        }
    }

    pub(crate) fn insert(&mut self, point: SkeletonPoint) -> Result<()> {
        let label = self.label;
        let index = point.index();
        if !self.grid_size.contains_index(index) {
            return Err(SkeletonError::LabelRange {
                label,
                source: RangeError::Index {
                    index,
                    grid: self.grid_size,
                },
            });
        }

        let (own, other) = if point.is_endpoint() {
            (&mut self.endpoints, &self.joints)
        } else {
            (&mut self.joints, &self.endpoints)
        };
        if other.contains(&index) {
            return Err(SkeletonError::OverlappingPoint { label, index });
        }
        if !own.insert(index) {
            return Err(SkeletonError::DuplicatePoint { label, index });
        }
        Ok(())
    }

    pub(crate) fn is_endpoint(&self, index: u64) -> bool {
        self.endpoints.contains(&index)
    }

    pub(crate) fn endpoint_count(&self) -> u64 {
        self.endpoints.len() as u64
    }

    /// The vector map's domain must equal the endpoint set.
    pub(crate) fn check_vectors(&self, vectors: &HashMap<u64, DVec3>) -> Result<()> {
        let label = self.label;
        if let Some(&index) = vectors.keys().find(|i| !self.endpoints.contains(*i)) {
            return Err(SkeletonError::UnknownEndpoint {
                label,
                index: i64::try_from(index).unwrap_or(i64::MAX),
            });
        }
        if let Some(&index) = self.endpoints.iter().find(|i| !vectors.contains_key(*i)) {
            return Err(SkeletonError::MissingVector { label, index });
        }
        Ok(())
    }
}
