//! Error types for skeleton persistence.
//!
//! Every variant is fatal for the load or write that produced it. Per-label
//! errors carry the label index so a corrupted file pair can be located.

use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::formats::SkeletonFileHeader;
use crate::grid::{GridCoord, GridSize};

pub type Result<T> = std::result::Result<T, SkeletonError>;

/// Which half of a companion file pair an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamRole {
    /// Classified point indices (`.pts`)
    Points,
    /// Endpoint tangent vectors (`.vec`)
    Vectors,
}

impl fmt::Display for StreamRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Points => f.write_str("points"),
            Self::Vectors => f.write_str("vectors"),
        }
    }
}

/// Coordinate or index outside the valid grid extent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RangeError {
    #[error("coordinate {coord} outside grid {grid}")]
    Coordinate { coord: GridCoord, grid: GridSize },

    #[error("linear index {index} outside grid {grid}")]
    Index { index: u64, grid: GridSize },

    /// Index too large for the signed on-disk encoding
    #[error("index {0} cannot be sign-encoded")]
    Unencodable(u64),
}

#[derive(Debug, thiserror::Error)]
pub enum SkeletonError {
    #[error(transparent)]
    Range(#[from] RangeError),

    #[error("label {label}: {source}")]
    LabelRange {
        label: u64,
        #[source]
        source: RangeError,
    },

    /// The two companion headers disagree
    #[error("companion headers disagree: points file has {points}, vectors file has {vectors}")]
    FormatMismatch {
        points: SkeletonFileHeader,
        vectors: SkeletonFileHeader,
    },

    /// Header grid differs from the grid the dataset metadata resolved to
    #[error("file pair is laid out over grid {found}, dataset expects {expected}")]
    GridSizeMismatch { expected: GridSize, found: GridSize },

    #[error("label {label}: vectors file lists {vectors} endpoints, points file has {points}")]
    CountMismatch { label: u64, points: u64, vectors: u64 },

    #[error("label {label}: vector given for index {index}, which is not an endpoint of this label")]
    UnknownEndpoint { label: u64, index: i64 },

    #[error("label {label}: endpoint {index} has more than one vector")]
    DuplicateVector { label: u64, index: u64 },

    #[error("label {label}: endpoint {index} has no vector")]
    MissingVector { label: u64, index: u64 },

    #[error("label {label}: index {index} listed more than once")]
    DuplicatePoint { label: u64, index: u64 },

    #[error("label {label}: index {index} classified as both joint and endpoint")]
    OverlappingPoint { label: u64, index: u64 },

    #[error("label {label}: {stream} file declares negative count {count}")]
    NegativeCount {
        stream: StreamRole,
        label: u64,
        count: i64,
    },

    #[error("{stream} file ended early while reading {context}")]
    TruncatedStream { stream: StreamRole, context: String },

    #[error("invalid {stream} header {header}: {reason}")]
    InvalidHeader {
        stream: StreamRole,
        header: SkeletonFileHeader,
        reason: &'static str,
    },

    #[error("I/O error on {stream} file: {source}")]
    Io {
        stream: StreamRole,
        #[source]
        source: io::Error,
    },

    #[error("failed to access {}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("metadata for dataset '{dataset}': {message}")]
    Metadata { dataset: String, message: String },
}

impl SkeletonError {
    /// Label the error refers to, when it is a per-label failure.
    pub fn label(&self) -> Option<u64> {
        match *self {
            Self::LabelRange { label, .. }
            | Self::CountMismatch { label, .. }
            | Self::UnknownEndpoint { label, .. }
            | Self::DuplicateVector { label, .. }
            | Self::MissingVector { label, .. }
            | Self::DuplicatePoint { label, .. }
            | Self::OverlappingPoint { label, .. }
            | Self::NegativeCount { label, .. } => Some(label),
            _ => None,
        }
    }

    pub(crate) fn file(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::File {
            path: path.into(),
            source,
        }
    }
}
