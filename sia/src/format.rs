// Copyright 2026 the Sia Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Byte-level primitives for the Sia wire format.
//!
//! All multi-byte quantities on the wire are little-endian and use the narrowest width that
//! holds them. [`Reader`] is the bounds-checked cursor used by decoding; [`ByteBuffer`] is the
//! growable (or fixed) output buffer used by encoding.

use core::fmt;

/// A low-level format error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormatError {
    /// Input ended unexpectedly.
    UnexpectedEof,
    /// A length or offset did not fit the host's address space.
    OutOfBounds,
    /// A string payload was not valid UTF-8.
    InvalidUtf8,
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedEof => write!(f, "unexpected end of input"),
            Self::OutOfBounds => write!(f, "out of bounds"),
            Self::InvalidUtf8 => write!(f, "invalid UTF-8"),
        }
    }
}

impl core::error::Error for FormatError {}

/// Returns the number of bytes needed to hold `v` (at least 1).
#[must_use]
pub const fn min_width(v: u64) -> u8 {
    let bits = 64 - v.leading_zeros();
    if bits == 0 { 1 } else { bits.div_ceil(8) as u8 }
}

/// Returns the operand address width class (1, 2, 4 or 8) that holds `v`.
#[must_use]
pub const fn address_width(v: u64) -> u8 {
    match min_width(v) {
        1 => 1,
        2 => 2,
        3 | 4 => 4,
        _ => 8,
    }
}

/// A simple byte reader with bounds checks.
#[derive(Clone, Debug)]
pub struct Reader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    /// Creates a reader over `bytes`.
    #[must_use]
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    /// Returns the current cursor offset.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Returns `true` if every byte has been consumed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.offset >= self.bytes.len()
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], FormatError> {
        let end = self
            .offset
            .checked_add(len)
            .ok_or(FormatError::OutOfBounds)?;
        let slice = self
            .bytes
            .get(self.offset..end)
            .ok_or(FormatError::UnexpectedEof)?;
        self.offset = end;
        Ok(slice)
    }

    /// Reads a `u8`.
    pub fn read_u8(&mut self) -> Result<u8, FormatError> {
        Ok(self.take(1)?[0])
    }

    /// Reads a little-endian unsigned integer of `width` bytes (`0..=8`).
    pub fn read_uint_le(&mut self, width: u8) -> Result<u64, FormatError> {
        let width = usize::from(width);
        if width > 8 {
            return Err(FormatError::OutOfBounds);
        }
        let b = self.take(width)?;
        let mut buf = [0_u8; 8];
        buf[..width].copy_from_slice(b);
        Ok(u64::from_le_bytes(buf))
    }

    /// Reads a little-endian `f64`.
    pub fn read_f64_le(&mut self) -> Result<f64, FormatError> {
        Ok(f64::from_bits(self.read_uint_le(8)?))
    }

    /// Reads `len` raw bytes.
    pub fn read_bytes(&mut self, len: u64) -> Result<&'a [u8], FormatError> {
        let len = usize::try_from(len).map_err(|_| FormatError::OutOfBounds)?;
        self.take(len)
    }

    /// Reads `len` bytes as UTF-8.
    pub fn read_str(&mut self, len: u64) -> Result<&'a str, FormatError> {
        let bytes = self.read_bytes(len)?;
        core::str::from_utf8(bytes).map_err(|_| FormatError::InvalidUtf8)
    }
}

/// How a [`ByteBuffer`] reacts when a write exceeds its capacity.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Growth {
    /// Double the capacity until the write fits.
    #[default]
    Double,
    /// Never grow; a write past the capacity fails.
    Fixed,
}

/// A write did not fit a fixed-capacity buffer.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BufferOverflow {
    /// Buffer capacity in bytes.
    pub capacity: usize,
    /// Total length the write needed.
    pub needed: usize,
}

impl fmt::Display for BufferOverflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "buffer overflow: need {} bytes, capacity is {}",
            self.needed, self.capacity
        )
    }
}

impl core::error::Error for BufferOverflow {}

/// Output buffer with an explicit capacity and growth policy.
///
/// The buffer is reused across encodes: [`ByteBuffer::clear`] resets the length and keeps the
/// allocation.
#[derive(Clone, Debug)]
pub struct ByteBuffer {
    bytes: Vec<u8>,
    capacity: usize,
    growth: Growth,
}

impl ByteBuffer {
    /// Creates a buffer with `capacity` bytes reserved.
    #[must_use]
    pub fn new(capacity: usize, growth: Growth) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
            capacity,
            growth,
        }
    }

    /// Returns the number of bytes written.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` if nothing has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Returns the logical capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the written bytes.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Resets the length to zero, keeping the allocation.
    pub fn clear(&mut self) {
        self.bytes.clear();
    }

    fn reserve(&mut self, extra: usize) -> Result<(), BufferOverflow> {
        let needed = self.bytes.len().saturating_add(extra);
        if needed <= self.capacity {
            return Ok(());
        }
        match self.growth {
            Growth::Fixed => Err(BufferOverflow {
                capacity: self.capacity,
                needed,
            }),
            Growth::Double => {
                let mut cap = self.capacity.max(1);
                while cap < needed {
                    cap = cap.saturating_mul(2);
                }
                self.bytes.reserve(cap - self.bytes.len());
                self.capacity = cap;
                Ok(())
            }
        }
    }

    /// Writes a single byte.
    pub fn write_u8(&mut self, b: u8) -> Result<(), BufferOverflow> {
        self.reserve(1)?;
        self.bytes.push(b);
        Ok(())
    }

    /// Writes the low `width` bytes of `v` little-endian.
    pub fn write_uint_le(&mut self, v: u64, width: u8) -> Result<(), BufferOverflow> {
        let width = usize::from(width.min(8));
        self.reserve(width)?;
        self.bytes.extend_from_slice(&v.to_le_bytes()[..width]);
        Ok(())
    }

    /// Writes a little-endian `f64`.
    pub fn write_f64_le(&mut self, v: f64) -> Result<(), BufferOverflow> {
        self.write_uint_le(v.to_bits(), 8)
    }

    /// Writes raw bytes.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), BufferOverflow> {
        self.reserve(bytes.len())?;
        self.bytes.extend_from_slice(bytes);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widths() {
        assert_eq!(min_width(0), 1);
        assert_eq!(min_width(0xFF), 1);
        assert_eq!(min_width(0x100), 2);
        assert_eq!(min_width(0xFFFF), 2);
        assert_eq!(min_width(0x1_0000), 3);
        assert_eq!(min_width(u64::MAX), 8);

        assert_eq!(address_width(0xFF), 1);
        assert_eq!(address_width(0x100), 2);
        assert_eq!(address_width(0x1_0000), 4);
        assert_eq!(address_width(0x1_0000_0000), 8);
    }

    #[test]
    fn reader_reports_eof() {
        let mut r = Reader::new(&[1, 2, 3]);
        assert_eq!(r.read_uint_le(2), Ok(0x0201));
        assert_eq!(r.read_uint_le(2), Err(FormatError::UnexpectedEof));
        assert_eq!(r.offset(), 2);
        assert_eq!(r.read_u8(), Ok(3));
        assert!(r.is_empty());
    }

    #[test]
    fn reader_rejects_bad_utf8() {
        let mut r = Reader::new(&[0xFF, 0xFE]);
        assert_eq!(r.read_str(2), Err(FormatError::InvalidUtf8));
    }

    #[test]
    fn doubling_buffer_grows() {
        let mut b = ByteBuffer::new(2, Growth::Double);
        b.write_bytes(&[1, 2, 3, 4, 5]).unwrap();
        assert_eq!(b.as_slice(), &[1, 2, 3, 4, 5]);
        assert_eq!(b.capacity(), 8);
        b.clear();
        assert!(b.is_empty());
        assert_eq!(b.capacity(), 8);
    }

    #[test]
    fn fixed_buffer_overflows() {
        let mut b = ByteBuffer::new(3, Growth::Fixed);
        b.write_uint_le(0x0102, 2).unwrap();
        assert_eq!(
            b.write_uint_le(0x0304, 2),
            Err(BufferOverflow {
                capacity: 3,
                needed: 4
            })
        );
        assert_eq!(b.as_slice(), &[2, 1]);
    }
}
