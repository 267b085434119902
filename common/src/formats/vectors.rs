//! Endpoint vector entry (32 bytes)
//!
//! # Layout
//! ```text
//! 0x00: index i64   (decoded, non-negative linear index of the endpoint)
//! 0x08: vz    f64
//! 0x10: vy    f64
//! 0x18: vx    f64
//! ```

use glam::DVec3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VectorEntry {
    pub index: i64,
    /// Direction as stored, `[vz, vy, vx]`
    pub direction: [f64; 3],
}

impl VectorEntry {
    pub const SIZE: usize = 32;

    pub fn new(index: i64, direction: [f64; 3]) -> Self {
        Self { index, direction }
    }

    /// Entry for a vector held in x, y, z components.
    pub fn from_dvec3(index: i64, v: DVec3) -> Self {
        Self::new(index, [v.z, v.y, v.x])
    }

    pub fn to_dvec3(&self) -> DVec3 {
        let [vz, vy, vx] = self.direction;
        DVec3::new(vx, vy, vz)
    }

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..8].copy_from_slice(&self.index.to_le_bytes());
        bytes[8..16].copy_from_slice(&self.direction[0].to_le_bytes());
        bytes[16..24].copy_from_slice(&self.direction[1].to_le_bytes());
        bytes[24..32].copy_from_slice(&self.direction[2].to_le_bytes());
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let array: &[u8; Self::SIZE] = bytes.get(..Self::SIZE)?.try_into().ok()?;
        Some(Self::from_array(array))
    }

    pub fn from_array(bytes: &[u8; Self::SIZE]) -> Self {
        let word = |offset: usize| {
            let mut word = [0u8; 8];
            word.copy_from_slice(&bytes[offset..offset + 8]);
            word
        };
        Self {
            index: i64::from_le_bytes(word(0)),
            direction: [
                f64::from_le_bytes(word(8)),
                f64::from_le_bytes(word(16)),
                f64::from_le_bytes(word(24)),
            ],
        }
    }
}
