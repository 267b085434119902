//! Skeleton persistence for labeled segmentation volumes
//!
//! Reads and writes the companion file pair that stores, for every label of
//! a dataset, its curve-skeleton vertices and one tangent vector per endpoint.
//!
//! # Modules
//!
//! - [`grid`] - Grid index codec (flatten/unflatten, joint/endpoint sign encoding)
//! - [`record`] - Per-label [`Skeleton`] records
//! - [`formats`] - Binary header, vector entry and file pair codec
//! - [`collection`] - [`SkeletonCollection`] loading and writing
//! - [`meta`] - Dataset metadata resolution
//! - [`paths`] - File pair naming
//! - [`tangent`] - Endpoint tangent estimation

pub mod collection;
pub mod error;
pub mod formats;
pub mod grid;
pub mod meta;
pub mod paths;
pub mod record;
pub mod tangent;

pub use collection::{CollectionSummary, SkeletonCollection};
pub use error::{RangeError, Result, SkeletonError, StreamRole};
pub use formats::{
    BinarySerializable, SkeletonFileHeader, VectorEntry, read_skeleton_pair, write_skeleton_pair,
};
pub use grid::{GridCoord, GridSize, Resolution, SkeletonPoint, decode_kind, encode_kind};
pub use meta::{
    DatasetMeta, MetadataResolver, SegmentationSource, SkeletonSection, StaticMetadataResolver,
    TomlMetadataResolver,
};
pub use paths::SkeletonPaths;
pub use record::{LabelPoints, Skeleton};
pub use tangent::estimate_endpoint_vectors;
