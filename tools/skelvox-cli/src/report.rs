//! JSON views of skeleton collections
//!
//! All triples are `(z, y, x)`, matching the on-disk order.

use serde::Serialize;
use skelvox_common::{RangeError, Skeleton, SkeletonCollection};

#[derive(Debug, Serialize)]
pub struct CollectionReport {
    pub dataset: String,
    pub grid_size: [u64; 3],
    pub resolution: [f64; 3],
    pub max_label: u64,
    pub skeletons: Vec<SkeletonReport>,
}

#[derive(Debug, Serialize)]
pub struct SkeletonReport {
    pub label: u64,
    /// "voxel" or "world"
    pub units: &'static str,
    pub joints: Vec<PointReport>,
    pub endpoints: Vec<EndpointReport>,
}

#[derive(Debug, Serialize)]
pub struct PointReport {
    pub index: u64,
    pub position: [f64; 3],
}

#[derive(Debug, Serialize)]
pub struct EndpointReport {
    pub index: u64,
    pub position: [f64; 3],
    pub vector: [f64; 3],
}

impl CollectionReport {
    pub fn new(
        dataset: &str,
        collection: &SkeletonCollection,
        world: bool,
        skip_empty: bool,
    ) -> Result<Self, RangeError> {
        let skeletons = collection
            .iter()
            .filter(|s| !(skip_empty && s.is_empty()))
            .map(|s| SkeletonReport::new(s, world))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            dataset: dataset.to_string(),
            grid_size: collection.grid_size().into(),
            resolution: collection.resolution().into(),
            max_label: collection.max_label(),
            skeletons,
        })
    }
}

impl SkeletonReport {
    pub fn new(skeleton: &Skeleton, world: bool) -> Result<Self, RangeError> {
        let position = |index: u64| -> Result<[f64; 3], RangeError> {
            let v = if world {
                skeleton.world_position(index)?
            } else {
                skeleton.grid_size().unflatten(index)?.as_dvec3()
            };
            Ok([v.z, v.y, v.x])
        };

        let joints = skeleton
            .joints()
            .iter()
            .map(|&index| -> Result<PointReport, RangeError> {
                Ok(PointReport {
                    index,
                    position: position(index)?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let endpoints = skeleton
            .endpoints()
            .iter()
            .map(|&index| -> Result<EndpointReport, RangeError> {
                let v = skeleton.vector(index).unwrap_or_default();
                Ok(EndpointReport {
                    index,
                    position: position(index)?,
                    vector: [v.z, v.y, v.x],
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            label: skeleton.label(),
            units: if world { "world" } else { "voxel" },
            joints,
            endpoints,
        })
    }
}
