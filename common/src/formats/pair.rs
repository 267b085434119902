//! Companion file pair codec
//!
//! A dataset's skeletons live in two files written and read in lockstep:
//!
//! ```text
//! points file:  header, then per label: [count][count × signed index]
//! vectors file: header, then per label: [count][count × (index, vz, vy, vx)]
//! ```
//!
//! Labels are implicit: the n-th block is label n. Decoding is strictly
//! sequential and any inconsistency aborts the whole read, so callers never
//! observe a partially decoded collection.

use std::io::{Read, Write};

use glam::DVec3;
use hashbrown::HashMap;
use tracing::{debug, trace};

use super::stream::{WordReader, WordWriter};
use super::{SkeletonFileHeader, VectorEntry};
use crate::collection::SkeletonCollection;
use crate::error::{Result, SkeletonError, StreamRole};
use crate::grid::{GridSize, Resolution, SkeletonPoint, encode_kind};
use crate::record::{LabelIndexSet, LabelPoints, Skeleton};

/// Upper bound on up-front allocations driven by counts read from disk.
const PREALLOC_LIMIT: u64 = 1 << 16;

/// Decode a points/vectors stream pair into a collection.
///
/// `expected_grid`, when given, must match the grid both headers declare.
pub fn read_skeleton_pair<P: Read, V: Read>(
    points: P,
    vectors: V,
    resolution: Resolution,
    expected_grid: Option<GridSize>,
) -> Result<SkeletonCollection> {
    let mut points = WordReader::new(points, StreamRole::Points);
    let mut vectors = WordReader::new(vectors, StreamRole::Vectors);

    let points_header: SkeletonFileHeader = points.read_record(|| "header".to_string())?;
    let vectors_header: SkeletonFileHeader = vectors.read_record(|| "header".to_string())?;
    if points_header != vectors_header {
        return Err(SkeletonError::FormatMismatch {
            points: points_header,
            vectors: vectors_header,
        });
    }

    let header = points_header;
    header
        .validate()
        .map_err(|reason| SkeletonError::InvalidHeader {
            stream: StreamRole::Points,
            header,
            reason,
        })?;
    let grid_size = header
        .grid_size()
        .ok_or(SkeletonError::InvalidHeader {
            stream: StreamRole::Points,
            header,
            reason: "negative grid dimension",
        })?;
    if let Some(expected) = expected_grid.filter(|&g| g != grid_size) {
        return Err(SkeletonError::GridSizeMismatch {
            expected,
            found: grid_size,
        });
    }

    let max_label = header.label_count();
    debug!(%grid_size, max_label, "reading skeleton file pair");

    let mut skeletons = Vec::with_capacity(max_label.min(PREALLOC_LIMIT) as usize);
    for label in 0..max_label {
        let skeleton = read_label(&mut points, &mut vectors, label, resolution, grid_size)?;
        skeletons.push(skeleton);
    }

    Ok(SkeletonCollection::from_validated(
        skeletons, resolution, grid_size,
    ))
}

fn read_label<P: Read, V: Read>(
    points: &mut WordReader<P>,
    vectors: &mut WordReader<V>,
    label: u64,
    resolution: Resolution,
    grid_size: GridSize,
) -> Result<Skeleton> {
    let count = points.read_count(label)?;

    let mut seen = LabelIndexSet::new(label, grid_size);
    let mut joints = Vec::with_capacity(count.min(PREALLOC_LIMIT) as usize);
    let mut endpoints = Vec::new();
    for n in 0..count {
        let signed = points.read_i64(|| format!("label {label} point {n} of {count}"))?;
        let point = SkeletonPoint::decode(signed);
        seen.insert(point)?;
        match point {
            SkeletonPoint::Joint(index) => joints.push(index),
            SkeletonPoint::Endpoint(index) => endpoints.push(index),
        }
    }

    let declared = vectors.read_count(label)?;
    if declared != seen.endpoint_count() {
        return Err(SkeletonError::CountMismatch {
            label,
            points: seen.endpoint_count(),
            vectors: declared,
        });
    }

    let mut tangents: HashMap<u64, DVec3> = HashMap::with_capacity(endpoints.len());
    for n in 0..declared {
        let entry: VectorEntry =
            vectors.read_record(|| format!("label {label} vector {n} of {declared}"))?;
        let index = u64::try_from(entry.index)
            .ok()
            .filter(|&i| seen.is_endpoint(i))
            .ok_or(SkeletonError::UnknownEndpoint {
                label,
                index: entry.index,
            })?;
        if tangents.insert(index, entry.to_dvec3()).is_some() {
            return Err(SkeletonError::DuplicateVector { label, index });
        }
    }

    trace!(
        label,
        joints = joints.len(),
        endpoints = endpoints.len(),
        "decoded label"
    );

    Ok(Skeleton::from_validated(
        label, joints, endpoints, tangents, resolution, grid_size,
    ))
}

/// Encode one [`LabelPoints`] per label into a points/vectors stream pair.
///
/// Every label is checked before any of its bytes are written: indices must
/// lie in the grid, no index may repeat or carry both kinds, and the vector
/// map must cover exactly the endpoints. Both writers are flushed on success.
pub fn write_skeleton_pair<P: Write, V: Write>(
    points: P,
    vectors: V,
    grid_size: GridSize,
    labels: &[LabelPoints],
) -> Result<()> {
    let header = SkeletonFileHeader::from_grid(grid_size, labels.len() as u64);
    header
        .validate()
        .map_err(|reason| SkeletonError::InvalidHeader {
            stream: StreamRole::Points,
            header,
            reason,
        })?;

    let mut points = WordWriter::new(points, StreamRole::Points);
    let mut vectors = WordWriter::new(vectors, StreamRole::Vectors);
    points.write_record(&header)?;
    vectors.write_record(&header)?;

    debug!(%grid_size, max_label = labels.len(), "writing skeleton file pair");

    for (label, entry) in labels.iter().enumerate() {
        write_label(&mut points, &mut vectors, label as u64, grid_size, entry)?;
    }

    points.flush()?;
    vectors.flush()
}

fn write_label<P: Write, V: Write>(
    points: &mut WordWriter<P>,
    vectors: &mut WordWriter<V>,
    label: u64,
    grid_size: GridSize,
    entry: &LabelPoints,
) -> Result<()> {
    let mut seen = LabelIndexSet::new(label, grid_size);
    for &point in &entry.points {
        seen.insert(point)?;
    }
    seen.check_vectors(&entry.vectors)?;

    points.write_i64(entry.points.len() as i64)?;
    for point in &entry.points {
        points.write_i64(point.encode()?)?;
    }

    vectors.write_i64(seen.endpoint_count() as i64)?;
    for index in entry.endpoints() {
        let vector = entry
            .vectors
            .get(&index)
            .copied()
            .ok_or(SkeletonError::MissingVector { label, index })?;
        let stored = encode_kind(index, false)?;
        vectors.write_record(&VectorEntry::from_dvec3(stored, vector))?;
    }

    trace!(label, points = entry.points.len(), "encoded label");
    Ok(())
}
