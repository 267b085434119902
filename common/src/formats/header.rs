//! Companion file header (32 bytes)
//!
//! Both the points file and the vectors file open with the same header.
//!
//! # Layout
//! ```text
//! 0x00: z_dim     i64
//! 0x08: y_dim     i64
//! 0x10: x_dim     i64
//! 0x18: max_label i64
//! ```
//!
//! All fields little-endian.

use std::fmt;

use crate::grid::GridSize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkeletonFileHeader {
    pub z_dim: i64,
    pub y_dim: i64,
    pub x_dim: i64,
    /// Number of labels; labels are `0..max_label`
    pub max_label: i64,
}

impl SkeletonFileHeader {
    pub const SIZE: usize = 32;

    pub fn new(z_dim: i64, y_dim: i64, x_dim: i64, max_label: i64) -> Self {
        Self {
            z_dim,
            y_dim,
            x_dim,
            max_label,
        }
    }

    /// Header for a grid and label count. Values past `i64::MAX` saturate and
    /// are caught by [`SkeletonFileHeader::validate`].
    pub fn from_grid(grid_size: GridSize, max_label: u64) -> Self {
        let field = |v: u64| i64::try_from(v).unwrap_or(i64::MAX);
        Self {
            z_dim: field(grid_size.z),
            y_dim: field(grid_size.y),
            x_dim: field(grid_size.x),
            max_label: field(max_label),
        }
    }

    /// Write header to bytes
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..8].copy_from_slice(&self.z_dim.to_le_bytes());
        bytes[8..16].copy_from_slice(&self.y_dim.to_le_bytes());
        bytes[16..24].copy_from_slice(&self.x_dim.to_le_bytes());
        bytes[24..32].copy_from_slice(&self.max_label.to_le_bytes());
        bytes
    }

    /// Read header from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let array: &[u8; Self::SIZE] = bytes.get(..Self::SIZE)?.try_into().ok()?;
        Some(Self::from_array(array))
    }

    pub fn from_array(bytes: &[u8; Self::SIZE]) -> Self {
        let field = |offset: usize| {
            let mut word = [0u8; 8];
            word.copy_from_slice(&bytes[offset..offset + 8]);
            i64::from_le_bytes(word)
        };
        Self {
            z_dim: field(0),
            y_dim: field(8),
            x_dim: field(16),
            max_label: field(24),
        }
    }

    /// Check the header describes a usable grid.
    ///
    /// The grid volume must stay below `i64::MAX` so every index in it can be
    /// sign-encoded.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.z_dim < 0 || self.y_dim < 0 || self.x_dim < 0 {
            return Err("negative grid dimension");
        }
        if self.max_label < 0 {
            return Err("negative label count");
        }
        self.z_dim
            .checked_mul(self.y_dim)
            .and_then(|sheet| sheet.checked_mul(self.x_dim))
            .filter(|&volume| volume < i64::MAX)
            .map(|_| ())
            .ok_or("grid volume exceeds the signed index range")
    }

    /// Grid the indices are flattened over. `None` for a negative dimension.
    pub fn grid_size(&self) -> Option<GridSize> {
        Some(GridSize::new(
            u64::try_from(self.z_dim).ok()?,
            u64::try_from(self.y_dim).ok()?,
            u64::try_from(self.x_dim).ok()?,
        ))
    }

    pub fn label_count(&self) -> u64 {
        u64::try_from(self.max_label).unwrap_or(0)
    }
}

impl fmt::Display for SkeletonFileHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}x{}x{}, {} labels]",
            self.z_dim, self.y_dim, self.x_dim, self.max_label
        )
    }
}
