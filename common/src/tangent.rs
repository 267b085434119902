//! Endpoint tangent estimation
//!
//! An endpoint's direction is taken from a short walk along the skeleton:
//! starting at the endpoint, step to the single unvisited 26-neighbour until
//! the path holds [`TANGENT_PATH_LEN`] points, a branch is reached, or the
//! skeleton ends. The vector points from the last visited point back to the
//! endpoint, normalised, in voxel (anisotropic) units. Scaling by the
//! resolution afterwards converts it to physical space.

use glam::DVec3;
use hashbrown::{HashMap, HashSet};

use crate::error::RangeError;
use crate::grid::{GridSize, SkeletonPoint};

/// Maximum number of points on the walk, endpoint included
pub const TANGENT_PATH_LEN: usize = 4;

/// Estimate one vector per endpoint of a label.
///
/// An isolated endpoint (no skeleton neighbours) gets the zero vector.
pub fn estimate_endpoint_vectors(
    grid_size: GridSize,
    points: &[SkeletonPoint],
) -> Result<HashMap<u64, DVec3>, RangeError> {
    let skeleton: HashSet<u64> = points.iter().map(SkeletonPoint::index).collect();

    points
        .iter()
        .filter(|p| p.is_endpoint())
        .map(|p| -> Result<(u64, DVec3), RangeError> {
            let index = p.index();
            Ok((index, endpoint_vector(grid_size, &skeleton, index)?))
        })
        .collect()
}

fn endpoint_vector(
    grid_size: GridSize,
    skeleton: &HashSet<u64>,
    endpoint: u64,
) -> Result<DVec3, RangeError> {
    let mut path = vec![endpoint];
    let mut current = endpoint;

    while path.len() < TANGENT_PATH_LEN {
        let next = {
            let mut candidates = grid_size
                .neighbours(current)?
                .filter(|n| skeleton.contains(n) && !path.contains(n));
            match (candidates.next(), candidates.next()) {
                (Some(only), None) => only,
                // dead end or branch
                _ => break,
            }
        };
        path.push(next);
        current = next;
    }

    let Some(&last) = path.last().filter(|_| path.len() > 1) else {
        return Ok(DVec3::ZERO);
    };
    let start = grid_size.unflatten(endpoint)?.as_dvec3();
    let end = grid_size.unflatten(last)?.as_dvec3();
    Ok((start - end).normalize_or_zero())
}
