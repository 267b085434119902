//! Little-endian word streams over one half of a file pair.
//!
//! Maps `UnexpectedEof` to [`SkeletonError::TruncatedStream`] and every other
//! I/O failure to [`SkeletonError::Io`], tagged with the stream's role.

use std::io::{self, Read, Write};

use super::BinarySerializable;
use crate::error::{Result, SkeletonError, StreamRole};

pub(crate) struct WordReader<R> {
    inner: R,
    role: StreamRole,
}

impl<R: Read> WordReader<R> {
    pub(crate) fn new(inner: R, role: StreamRole) -> Self {
        Self { inner, role }
    }

    fn fill<F>(&mut self, buf: &mut [u8], context: F) -> Result<()>
    where
        F: FnOnce() -> String,
    {
        self.inner.read_exact(buf).map_err(|e| match e.kind() {
            io::ErrorKind::UnexpectedEof => SkeletonError::TruncatedStream {
                stream: self.role,
                context: context(),
            },
            _ => SkeletonError::Io {
                stream: self.role,
                source: e,
            },
        })
    }

    /// Read one fixed-size record.
    ///
    /// Headers are returned unvalidated so that mismatched pairs are reported
    /// as such even when one side is garbage.
    pub(crate) fn read_record<T, F>(&mut self, context: F) -> Result<T>
    where
        T: BinarySerializable,
        F: FnOnce() -> String,
    {
        let mut bytes = vec![0u8; T::SIZE];
        self.fill(&mut bytes, context)?;
        T::deserialize(&bytes).ok_or_else(|| SkeletonError::TruncatedStream {
            stream: self.role,
            context: format!("{}-byte record", T::SIZE),
        })
    }

    pub(crate) fn read_i64<F>(&mut self, context: F) -> Result<i64>
    where
        F: FnOnce() -> String,
    {
        let mut bytes = [0u8; 8];
        self.fill(&mut bytes, context)?;
        Ok(i64::from_le_bytes(bytes))
    }

    /// Read a per-label element count, rejecting negative values.
    pub(crate) fn read_count(&mut self, label: u64) -> Result<u64> {
        let count = self.read_i64(|| format!("label {label} count"))?;
        u64::try_from(count).map_err(|_| SkeletonError::NegativeCount {
            stream: self.role,
            label,
            count,
        })
    }
}

pub(crate) struct WordWriter<W> {
    inner: W,
    role: StreamRole,
}

impl<W: Write> WordWriter<W> {
    pub(crate) fn new(inner: W, role: StreamRole) -> Self {
        Self { inner, role }
    }

    fn put(&mut self, bytes: &[u8]) -> Result<()> {
        self.inner.write_all(bytes).map_err(|source| SkeletonError::Io {
            stream: self.role,
            source,
        })
    }

    pub(crate) fn write_record<T: BinarySerializable>(&mut self, record: &T) -> Result<()> {
        self.put(&record.serialize())
    }

    pub(crate) fn write_i64(&mut self, value: i64) -> Result<()> {
        self.put(&value.to_le_bytes())
    }

    pub(crate) fn flush(&mut self) -> Result<()> {
        self.inner.flush().map_err(|source| SkeletonError::Io {
            stream: self.role,
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::{SkeletonFileHeader, VectorEntry};

    #[test]
    fn test_records_roundtrip_through_stream() {
        let header = SkeletonFileHeader::new(2, 3, 4, 5);
        let entry = VectorEntry::new(7, [0.5, 0.0, -0.5]);

        let mut bytes = Vec::new();
        let mut writer = WordWriter::new(&mut bytes, StreamRole::Vectors);
        writer.write_record(&header).unwrap();
        writer.write_record(&entry).unwrap();
        writer.flush().unwrap();
        assert_eq!(bytes.len(), 64);

        let mut reader = WordReader::new(&bytes[..], StreamRole::Vectors);
        let read_header: SkeletonFileHeader = reader.read_record(|| "header".to_string()).unwrap();
        let read_entry: VectorEntry = reader.read_record(|| "entry".to_string()).unwrap();
        assert_eq!(read_header, header);
        assert_eq!(read_entry, entry);
    }

    #[test]
    fn test_short_record_is_truncation() {
        let bytes = [0u8; 20];
        let mut reader = WordReader::new(&bytes[..], StreamRole::Vectors);
        let err = reader
            .read_record::<VectorEntry, _>(|| "label 4 vector 0".to_string())
            .unwrap_err();
        match err {
            SkeletonError::TruncatedStream { stream, context } => {
                assert_eq!(stream, StreamRole::Vectors);
                assert_eq!(context, "label 4 vector 0");
            }
            other => panic!("expected truncation, got {other:?}"),
        }
    }
}
