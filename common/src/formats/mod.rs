//! On-disk skeleton formats
//!
//! POD formats with no magic bytes; the file pair is identified by its path
//! names. All integers are little-endian `i64`, all floats little-endian `f64`.
//!
//! - [`SkeletonFileHeader`] - 32-byte header shared by both files
//! - [`VectorEntry`] - 32-byte endpoint vector record
//! - [`read_skeleton_pair`] / [`write_skeleton_pair`] - lockstep pair codec

mod header;
mod pair;
mod serialization;
mod stream;
mod vectors;

pub use header::SkeletonFileHeader;
pub use pair::{read_skeleton_pair, write_skeleton_pair};
pub use serialization::BinarySerializable;
pub use vectors::VectorEntry;

/// Extension of the points file
pub const POINTS_EXT: &str = "pts";

/// Extension of the vectors file
pub const VECTORS_EXT: &str = "vec";
