//! Grid index codec
//!
//! Converts between `(z, y, x)` voxel coordinates and row-major linear indices,
//! and packs the joint/endpoint classification of a skeleton point into the
//! sign of a 64-bit integer.
//!
//! # Encoding
//! ```text
//! joint    index i  ->  i            (i >= 0)
//! endpoint index i  ->  -(i + 1)     (always < 0, so index 0 stays distinguishable)
//! ```

use std::fmt;

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::error::RangeError;

/// Dimensions `(z, y, x)` of the voxel grid that skeleton indices are flattened over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[u64; 3]", into = "[u64; 3]")]
pub struct GridSize {
    pub z: u64,
    pub y: u64,
    pub x: u64,
}

/// A voxel coordinate inside a [`GridSize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridCoord {
    pub z: u64,
    pub y: u64,
    pub x: u64,
}

impl GridCoord {
    pub const fn new(z: u64, y: u64, x: u64) -> Self {
        Self { z, y, x }
    }

    /// Voxel coordinate as a vector (x, y, z components).
    pub fn as_dvec3(&self) -> DVec3 {
        DVec3::new(self.x as f64, self.y as f64, self.z as f64)
    }
}

impl fmt::Display for GridCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.z, self.y, self.x)
    }
}

impl GridSize {
    pub const fn new(z: u64, y: u64, x: u64) -> Self {
        Self { z, y, x }
    }

    /// Number of voxels in one z-slice
    pub const fn sheet_size(&self) -> u64 {
        self.y.saturating_mul(self.x)
    }

    /// Number of voxels in one row
    pub const fn row_size(&self) -> u64 {
        self.x
    }

    /// Total number of cells. Saturates instead of overflowing; headers with
    /// volumes past `i64::MAX` are rejected before a grid is ever built.
    pub const fn volume(&self) -> u64 {
        self.z.saturating_mul(self.sheet_size())
    }

    pub fn contains(&self, coord: GridCoord) -> bool {
        coord.z < self.z && coord.y < self.y && coord.x < self.x
    }

    pub fn contains_index(&self, index: u64) -> bool {
        index < self.volume()
    }

    /// Row-major flattening: `z * Y * X + y * X + x`.
    ///
    /// Fails for coordinates outside the grid and for indices that do not fit
    /// in a `u64` on oversized grids.
    pub fn flatten(&self, coord: GridCoord) -> Result<u64, RangeError> {
        let out_of_range = RangeError::Coordinate { coord, grid: *self };
        if !self.contains(coord) {
            return Err(out_of_range);
        }
        coord
            .z
            .checked_mul(self.y)
            .and_then(|v| v.checked_add(coord.y))
            .and_then(|v| v.checked_mul(self.x))
            .and_then(|v| v.checked_add(coord.x))
            .ok_or(out_of_range)
    }

    /// Exact inverse of [`GridSize::flatten`].
    pub fn unflatten(&self, index: u64) -> Result<GridCoord, RangeError> {
        if !self.contains_index(index) {
            return Err(RangeError::Index { index, grid: *self });
        }
        let z = index / self.sheet_size();
        let y = (index - z * self.sheet_size()) / self.row_size();
        let x = index % self.row_size();
        Ok(GridCoord { z, y, x })
    }

    /// Linear indices of the in-bounds 26-connected neighbours of `index`
    /// (the cell itself excluded).
    pub fn neighbours(&self, index: u64) -> Result<impl Iterator<Item = u64>, RangeError> {
        let centre = self.unflatten(index)?;
        let grid = *self;
        let offsets = (-1i64..=1).flat_map(|dz| {
            (-1i64..=1).flat_map(move |dy| (-1i64..=1).map(move |dx| (dz, dy, dx)))
        });

        Ok(offsets.filter_map(move |(dz, dy, dx)| {
            if dz == 0 && dy == 0 && dx == 0 {
                return None;
            }
            let coord = GridCoord {
                z: centre.z.checked_add_signed(dz)?,
                y: centre.y.checked_add_signed(dy)?,
                x: centre.x.checked_add_signed(dx)?,
            };
            grid.flatten(coord).ok()
        }))
    }
}

impl fmt::Display for GridSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}x{}", self.z, self.y, self.x)
    }
}

impl From<[u64; 3]> for GridSize {
    fn from([z, y, x]: [u64; 3]) -> Self {
        Self { z, y, x }
    }
}

impl From<GridSize> for [u64; 3] {
    fn from(grid: GridSize) -> Self {
        [grid.z, grid.y, grid.x]
    }
}

/// Physical voxel size `(z, y, x)`, shared by every skeleton of a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct Resolution {
    pub z: f64,
    pub y: f64,
    pub x: f64,
}

impl Resolution {
    pub const fn new(z: f64, y: f64, x: f64) -> Self {
        Self { z, y, x }
    }

    /// Voxel size as a scale vector (x, y, z components).
    pub fn as_dvec3(&self) -> DVec3 {
        DVec3::new(self.x, self.y, self.z)
    }
}

impl From<[f64; 3]> for Resolution {
    fn from([z, y, x]: [f64; 3]) -> Self {
        Self { z, y, x }
    }
}

impl From<Resolution> for [f64; 3] {
    fn from(res: Resolution) -> Self {
        [res.z, res.y, res.x]
    }
}

/// A classified skeleton vertex.
///
/// The on-disk sign encoding is decoded into this enum once at read time;
/// nothing past the file codec looks at raw signed indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkeletonPoint {
    /// Interior vertex
    Joint(u64),
    /// Terminal (degree-1) vertex
    Endpoint(u64),
}

impl SkeletonPoint {
    pub const fn index(&self) -> u64 {
        match *self {
            Self::Joint(index) | Self::Endpoint(index) => index,
        }
    }

    pub const fn is_endpoint(&self) -> bool {
        matches!(self, Self::Endpoint(_))
    }

    /// Signed on-disk representation.
    pub fn encode(&self) -> Result<i64, RangeError> {
        encode_kind(self.index(), self.is_endpoint())
    }

    pub fn decode(signed: i64) -> Self {
        match decode_kind(signed) {
            (index, true) => Self::Endpoint(index),
            (index, false) => Self::Joint(index),
        }
    }
}

/// Pack an index and its classification into one signed value.
///
/// Fails when the index cannot be represented (`index >= i64::MAX`).
pub fn encode_kind(index: u64, is_endpoint: bool) -> Result<i64, RangeError> {
    let signed = i64::try_from(index)
        .ok()
        .filter(|&i| i < i64::MAX)
        .ok_or(RangeError::Unencodable(index))?;

    Ok(if is_endpoint { -(signed + 1) } else { signed })
}

/// Inverse of [`encode_kind`]; negative values are endpoints.
pub fn decode_kind(signed: i64) -> (u64, bool) {
    if signed < 0 {
        // signed + 1 is at least i64::MIN + 1, so the negation cannot overflow
        ((-(signed + 1)) as u64, true)
    } else {
        (signed as u64, false)
    }
}
