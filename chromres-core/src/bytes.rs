//! Bounded, little-endian reads over an in-memory buffer.
//!
//! The source file is read into memory once; everything downstream operates on slices of it
//! rather than re-opening or streaming the file, so every read here is a bounds check followed
//! by a `byteorder` decode.
use byteorder::{ByteOrder, LittleEndian};

use crate::errors::ResError;

/// A bounds-checked view over an immutable byte buffer.
pub struct ByteReader<'a> {
    buf: &'a [u8],
}

impl<'a> ByteReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        ByteReader { buf }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_slice(&self) -> &'a [u8] {
        self.buf
    }

    /// Read `len` bytes at `at`. Fails with [`ResError::TruncatedInput`] if that range runs
    /// past the end of the buffer.
    pub fn slice(&self, at: usize, len: usize) -> Result<&'a [u8], ResError> {
        let end = at.checked_add(len).ok_or(ResError::TruncatedInput {
            at,
            needed: len,
            len: self.buf.len(),
        })?;
        self.buf.get(at..end).ok_or(ResError::TruncatedInput {
            at,
            needed: len,
            len: self.buf.len(),
        })
    }

    pub fn i32_le(&self, at: usize) -> Result<i32, ResError> {
        Ok(LittleEndian::read_i32(self.slice(at, 4)?))
    }

    pub fn u32_le(&self, at: usize) -> Result<u32, ResError> {
        Ok(LittleEndian::read_u32(self.slice(at, 4)?))
    }

    pub fn f32_le(&self, at: usize) -> Result<f32, ResError> {
        Ok(LittleEndian::read_f32(self.slice(at, 4)?))
    }

    pub fn f64_le(&self, at: usize) -> Result<f64, ResError> {
        Ok(LittleEndian::read_f64(self.slice(at, 8)?))
    }

    /// Find the first occurrence of `needle` at or after `from`.
    pub fn find(&self, needle: &[u8], from: usize) -> Option<usize> {
        if from >= self.buf.len() || needle.is_empty() {
            return None;
        }
        self.buf[from..]
            .windows(needle.len())
            .position(|w| w == needle)
            .map(|i| i + from)
    }

    /// Find the last occurrence of `needle` in the whole buffer.
    pub fn rfind(&self, needle: &[u8]) -> Option<usize> {
        if needle.is_empty() || needle.len() > self.buf.len() {
            return None;
        }
        self.buf
            .windows(needle.len())
            .rposition(|w| w == needle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_little_endian_i32() {
        let buf = 42i32.to_le_bytes();
        let r = ByteReader::new(&buf);
        assert_eq!(r.i32_le(0).unwrap(), 42);
    }

    #[test]
    fn reads_little_endian_f64() {
        let buf = 3.5f64.to_le_bytes();
        let r = ByteReader::new(&buf);
        assert_eq!(r.f64_le(0).unwrap(), 3.5);
    }

    #[test]
    fn truncated_read_is_an_error() {
        let buf = [0u8; 2];
        let r = ByteReader::new(&buf);
        assert!(r.i32_le(0).is_err());
    }

    #[test]
    fn find_and_rfind() {
        let buf = b"abcXYZdefXYZghi".to_vec();
        let r = ByteReader::new(&buf);
        assert_eq!(r.find(b"XYZ", 0), Some(3));
        assert_eq!(r.find(b"XYZ", 4), Some(9));
        assert_eq!(r.rfind(b"XYZ"), Some(9));
        assert_eq!(r.find(b"nope", 0), None);
    }
}
