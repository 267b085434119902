//! Binary serialization trait for the fixed-size records of a file pair.
//!
//! Headers keep their type-specific `to_bytes()` returning a fixed-size
//! array; the word streams read and write every record through this trait.

/// Trait for fixed-size binary records.
///
/// Uses `Vec<u8>` for the return type because associated consts cannot size
/// a return array (`[u8; Self::SIZE]`) on stable Rust.
pub trait BinarySerializable: Sized {
    /// Size of the serialized record in bytes.
    const SIZE: usize;

    fn serialize(&self) -> Vec<u8>;

    /// Returns `None` if the byte slice is too short.
    fn deserialize(bytes: &[u8]) -> Option<Self>;
}

impl BinarySerializable for super::SkeletonFileHeader {
    const SIZE: usize = Self::SIZE;

    fn serialize(&self) -> Vec<u8> {
        self.to_bytes().to_vec()
    }

    fn deserialize(bytes: &[u8]) -> Option<Self> {
        Self::from_bytes(bytes)
    }
}

impl BinarySerializable for super::VectorEntry {
    const SIZE: usize = Self::SIZE;

    fn serialize(&self) -> Vec<u8> {
        self.to_bytes().to_vec()
    }

    fn deserialize(bytes: &[u8]) -> Option<Self> {
        Self::from_bytes(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::{SkeletonFileHeader, VectorEntry};

    #[test]
    fn test_header_trait() {
        let header = SkeletonFileHeader::new(8, 16, 32, 3);
        let bytes = header.serialize();
        assert_eq!(bytes.len(), <SkeletonFileHeader as BinarySerializable>::SIZE);

        let parsed = SkeletonFileHeader::deserialize(&bytes).unwrap();
        assert_eq!(parsed, header);
    }

    #[test]
    fn test_vector_entry_trait() {
        let entry = VectorEntry::new(7, [1.0, 0.0, -0.5]);
        let bytes = entry.serialize();
        assert_eq!(bytes.len(), 32);

        let parsed = VectorEntry::deserialize(&bytes).unwrap();
        assert_eq!(parsed, entry);
    }

    #[test]
    fn test_deserialize_insufficient_bytes() {
        assert!(SkeletonFileHeader::deserialize(&[0; 31]).is_none());
        assert!(VectorEntry::deserialize(&[0; 31]).is_none());
    }

    fn record_size<T: BinarySerializable>() -> usize {
        T::SIZE
    }

    #[test]
    fn test_generic_usage() {
        assert_eq!(record_size::<SkeletonFileHeader>(), 32);
        assert_eq!(record_size::<VectorEntry>(), 32);
    }
}
